//! Gym-compatible simulator driven through a child process.
//!
//! The child reads one JSON request per line on stdin and answers each with
//! exactly one JSON line on stdout. Anything it prints to stderr is passed
//! through to ours. `scripts/gym_bridge.py` implements the other end for
//! gym and gymnasium.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use teleop_core::{
    DiscreteAction, DiscreteSpace, EnvError, Environment, EnvironmentConfig, Result, Reward, Step,
    StepInfo, VectorObservation,
};

use crate::protocol::{Reply, Request};

/// Command used when the config does not name one
pub const DEFAULT_BRIDGE_COMMAND: [&str; 3] = ["python3", "-u", "scripts/gym_bridge.py"];

/// How long `close` waits for the simulator to exit before killing it
pub const CLOSE_GRACE: Duration = Duration::from_secs(2);

const EXIT_POLL: Duration = Duration::from_millis(10);

/// Bridge settings carried in [`EnvironmentConfig::params`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeParams {
    /// Program and arguments of the simulator process
    #[serde(default = "default_bridge_command")]
    pub bridge: Vec<String>,
}

fn default_bridge_command() -> Vec<String> {
    DEFAULT_BRIDGE_COMMAND.iter().map(ToString::to_string).collect()
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            bridge: default_bridge_command(),
        }
    }
}

impl BridgeParams {
    /// Extract bridge settings from an environment config
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self> {
        let params = serde_json::Value::Object(config.params.clone());
        Ok(serde_json::from_value(params)?)
    }
}

/// Environment backed by an external simulator process
pub struct GymBridgeEnv {
    id: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    action_space: Option<DiscreteSpace>,
    closed: bool,
}

impl GymBridgeEnv {
    /// Launch the simulator named by `config` and create environment `id` in it
    pub fn spawn(id: &str, config: &EnvironmentConfig) -> Result<Self> {
        let params = BridgeParams::from_config(config)?;
        let (program, args) = params
            .bridge
            .split_first()
            .ok_or_else(|| EnvError::Environment("empty bridge command".to_string()))?;

        tracing::info!(env = id, command = ?params.bridge, "starting simulator bridge");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EnvError::Environment(format!("failed to start `{program}`: {e}")))?;

        let stdin = child.stdin.take();
        let stdout = match child.stdout.take() {
            Some(stdout) => BufReader::new(stdout),
            None => {
                let _ = child.kill();
                return Err(EnvError::Protocol("bridge stdout unavailable".to_string()));
            }
        };

        let mut env = Self {
            id: id.to_string(),
            child,
            stdin,
            stdout,
            action_space: None,
            closed: false,
        };

        let reply = env.request(&Request::Make {
            id,
            render_mode: config.render_mode.as_deref(),
            seed: config.seed,
            max_steps: config.max_steps,
        })?;
        env.action_space = reply.action_space.map(DiscreteSpace::new);

        tracing::debug!(env = id, action_space = ?env.action_space, "simulator ready");
        Ok(env)
    }

    /// Environment id this bridge was created with
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait up to [`CLOSE_GRACE`] for the child to exit, then kill it
    fn reap(&mut self) -> Result<ExitStatus> {
        let deadline = Instant::now() + CLOSE_GRACE;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(EXIT_POLL);
        }

        tracing::warn!(env = %self.id, grace = ?CLOSE_GRACE, "simulator did not exit; killing");
        // Already exited between the last poll and now is fine.
        let _ = self.child.kill();
        Ok(self.child.wait()?)
    }

    fn request(&mut self, request: &Request<'_>) -> Result<Reply> {
        if self.closed {
            return Err(EnvError::Closed);
        }
        let stdin = self.stdin.as_mut().ok_or(EnvError::Closed)?;

        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');
        stdin.write_all(&line)?;
        stdin.flush()?;

        let mut buf = String::new();
        if self.stdout.read_line(&mut buf)? == 0 {
            return Err(EnvError::Protocol(format!(
                "simulator exited before answering `{}`",
                request.op()
            )));
        }

        let reply: Reply = serde_json::from_str(buf.trim_end())
            .map_err(|e| EnvError::Protocol(format!("malformed reply to `{}`: {e}", request.op())))?;

        if reply.ok {
            Ok(reply)
        } else {
            Err(EnvError::Environment(
                reply
                    .error
                    .unwrap_or_else(|| format!("`{}` failed", request.op())),
            ))
        }
    }
}

impl Environment for GymBridgeEnv {
    type Observation = VectorObservation;
    type Action = DiscreteAction;

    fn action_space(&self) -> Option<DiscreteSpace> {
        self.action_space
    }

    fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        let reply = self.request(&Request::Reset)?;
        let info = StepInfo {
            fields: reply.info.unwrap_or_default(),
        };
        Ok((reply.observation.unwrap_or_default().into(), info))
    }

    fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>> {
        if let Some(space) = self.action_space {
            if !space.contains(&action) {
                return Err(EnvError::InvalidAction(format!(
                    "{} is outside 0..{}",
                    action.0, space.n
                )));
            }
        }

        let reply = self.request(&Request::Step { action: action.0 })?;
        Ok(Step {
            observation: reply.observation.unwrap_or_default().into(),
            reward: Reward(reply.reward.unwrap_or_default()),
            done: reply.done.unwrap_or(false),
            truncated: reply.truncated.unwrap_or(false),
            info: StepInfo {
                fields: reply.info.unwrap_or_default(),
            },
        })
    }

    fn render(&mut self) -> Result<()> {
        self.request(&Request::Render).map(|_| ())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let reply = self.request(&Request::Close);
        self.closed = true;
        // EOF on stdin lets a well-behaved bridge exit even if it ignored `close`.
        drop(self.stdin.take());
        let status = self.reap()?;

        tracing::info!(env = %self.id, %status, "simulator closed");
        reply.map(|_| ())
    }
}

impl Drop for GymBridgeEnv {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(env = %self.id, "simulator dropped without close; killing");
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
