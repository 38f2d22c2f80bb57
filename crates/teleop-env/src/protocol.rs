//! Line-delimited JSON messages exchanged with the simulator process

use serde::{Deserialize, Serialize};

/// One request per line on the child's stdin
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum Request<'a> {
    Make {
        id: &'a str,
        render_mode: Option<&'a str>,
        seed: Option<u64>,
        max_steps: Option<usize>,
    },
    Reset,
    Step {
        action: usize,
    },
    Render,
    Close,
}

impl Request<'_> {
    pub(crate) fn op(&self) -> &'static str {
        match self {
            Self::Make { .. } => "make",
            Self::Reset => "reset",
            Self::Step { .. } => "step",
            Self::Render => "render",
            Self::Close => "close",
        }
    }
}

/// One reply per line on the child's stdout
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Reply {
    pub ok: bool,
    pub error: Option<String>,
    pub observation: Option<Vec<f64>>,
    pub reward: Option<f64>,
    pub done: Option<bool>,
    pub truncated: Option<bool>,
    pub action_space: Option<usize>,
    pub info: Option<serde_json::Map<String, serde_json::Value>>,
}
