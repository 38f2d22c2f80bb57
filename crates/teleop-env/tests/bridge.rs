//! Drives `GymBridgeEnv` against small shell scripts standing in for the
//! simulator process, and `scripts/gym_bridge.py` against stub gym modules.

use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use teleop_env::{
    DiscreteAction, EnvError, Environment, EnvironmentConfig, GymBridgeEnv, CLOSE_GRACE,
};

const HAPPY_SIM: &str = r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"make"'*) echo '{"ok":true,"action_space":4}' ;;
    *'"op":"reset"'*) echo '{"ok":true,"observation":[0.0,1.4],"info":{"seeded":false}}' ;;
    *'"op":"step","action":2'*) echo '{"ok":true,"observation":[0.0,1.3],"reward":-0.3,"done":false}' ;;
    *'"op":"step"'*) echo '{"ok":true,"observation":[0.0,1.2],"reward":-100.0,"done":true}' ;;
    *'"op":"render"'*) echo '{"ok":true}' ;;
    *'"op":"close"'*) echo '{"ok":true}'; exit 0 ;;
    *) echo '{"ok":false,"error":"unknown op"}' ;;
  esac
done
"#;

fn config_for(script: &str) -> EnvironmentConfig {
    let mut config = EnvironmentConfig::default();
    config.params.insert(
        "bridge".to_string(),
        serde_json::json!(["sh", "-c", script]),
    );
    config
}

#[test]
fn test_full_session() {
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config_for(HAPPY_SIM)).unwrap();
    assert_eq!(env.id(), "LunarLander-v2");
    assert_eq!(env.action_space().map(|s| s.n), Some(4));

    let (obs, info) = env.reset().unwrap();
    assert_eq!(obs.data, vec![0.0, 1.4]);
    assert_eq!(info.fields.get("seeded"), Some(&serde_json::json!(false)));

    env.render().unwrap();
    let step = env.step(DiscreteAction(2)).unwrap();
    assert_eq!(step.observation.data, vec![0.0, 1.3]);
    assert!((step.reward.0 + 0.3).abs() < 1e-9);
    assert!(!step.done);

    let step = env.step(DiscreteAction(0)).unwrap();
    assert!(step.done);

    env.close().unwrap();
}

#[test]
fn test_close_is_idempotent() {
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config_for(HAPPY_SIM)).unwrap();
    env.close().unwrap();
    env.close().unwrap();

    let err = env.reset().err().unwrap();
    assert!(matches!(err, EnvError::Closed));
}

#[test]
fn test_action_outside_space() {
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config_for(HAPPY_SIM)).unwrap();
    env.reset().unwrap();

    let err = env.step(DiscreteAction(4)).err().unwrap();
    assert!(matches!(err, EnvError::InvalidAction(_)));

    // Bridge is still usable afterwards
    assert!(env.step(DiscreteAction(2)).is_ok());
    env.close().unwrap();
}

#[test]
fn test_backend_failure_is_reported() {
    let script = r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"make"'*) echo '{"ok":true,"action_space":4}' ;;
    *'"op":"close"'*) echo '{"ok":true}'; exit 0 ;;
    *) echo '{"ok":false,"error":"box2d not installed"}' ;;
  esac
done
"#;
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config_for(script)).unwrap();

    match env.reset() {
        Err(EnvError::Environment(msg)) => assert_eq!(msg, "box2d not installed"),
        other => panic!("expected environment error, got {:?}", other.map(|_| ())),
    }
    env.close().unwrap();
}

#[test]
fn test_make_failure_aborts_spawn() {
    let script = r#"read -r line; echo '{"ok":false,"error":"unknown env"}'"#;
    let err = GymBridgeEnv::spawn("Nope-v0", &config_for(script)).err().unwrap();
    assert!(matches!(err, EnvError::Environment(ref msg) if msg == "unknown env"));
}

#[test]
fn test_simulator_exit_is_protocol_error() {
    let script = r#"read -r line; echo '{"ok":true,"action_space":4}'; exit 0"#;
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config_for(script)).unwrap();

    let err = env.reset().err().unwrap();
    assert!(matches!(err, EnvError::Protocol(_) | EnvError::Io(_)));
}

#[test]
fn test_garbage_reply_is_protocol_error() {
    let script = r#"read -r line; echo 'Box2D warming up...'"#;
    let err = GymBridgeEnv::spawn("LunarLander-v2", &config_for(script)).err().unwrap();
    assert!(matches!(err, EnvError::Protocol(_)));
}

#[test]
fn test_missing_program() {
    let mut config = EnvironmentConfig::default();
    config.params.insert(
        "bridge".to_string(),
        serde_json::json!(["/nonexistent/simulator-binary"]),
    );
    let err = GymBridgeEnv::spawn("LunarLander-v2", &config).err().unwrap();
    assert!(matches!(err, EnvError::Environment(_)));
}

#[test]
fn test_close_kills_bridge_that_never_exits() {
    let script = r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"make"'*) echo '{"ok":true,"action_space":4}' ;;
    *'"op":"close"'*) echo '{"ok":true}'; exec sleep 30 ;;
  esac
done
"#;
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config_for(script)).unwrap();

    let started = Instant::now();
    env.close().unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= CLOSE_GRACE, "returned before the grace period: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "close hung for {elapsed:?}");
}

// Stub gymnasium: in human mode every reset/step draws, like the real one.
const GYMNASIUM_STUB: &str = r#"
renders = 0


class Discrete:
    n = 4


class LanderStub:
    def __init__(self, render_mode=None):
        self.render_mode = render_mode
        self.action_space = Discrete()

    def _draw(self):
        global renders
        renders += 1

    def reset(self, seed=None):
        if self.render_mode == "human":
            self._draw()
        return [0.0, 1.4], {"renders": renders}

    def step(self, action):
        if self.render_mode == "human":
            self._draw()
        return [0.0, 1.3], -0.3, False, False, {"renders": renders}

    def render(self):
        self._draw()

    def close(self):
        pass


def make(env_id, render_mode=None, max_episode_steps=None):
    return LanderStub(render_mode=render_mode)
"#;

// Stub pre-0.26 gym: no render_mode in make, draws only in render(mode=...).
const LEGACY_GYM_STUB: &str = r#"
renders = 0
mode = ""


class Discrete:
    n = 4


class LanderStub:
    action_space = Discrete()

    def seed(self, seed):
        pass

    def reset(self):
        return [0.0, 1.4]

    def step(self, action):
        return [0.0, 1.3], -0.3, False, {"renders": renders, "mode": mode}

    def render(self, mode="human"):
        global renders
        renders += 1
        globals()["mode"] = mode

    def close(self):
        pass


def make(env_id, **kwargs):
    if "render_mode" in kwargs:
        raise TypeError("__init__() got an unexpected keyword argument 'render_mode'")
    return LanderStub()
"#;

fn python_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn python_bridge_config(modules: &Path, render_mode: &str) -> EnvironmentConfig {
    let script = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scripts/gym_bridge.py");
    let mut config = EnvironmentConfig::default();
    config.render_mode = Some(render_mode.to_string());
    config.params.insert(
        "bridge".to_string(),
        serde_json::json!([
            "env",
            format!("PYTHONPATH={}", modules.display()),
            "python3",
            "-u",
            script
        ]),
    );
    config
}

fn renders(info: &teleop_env::StepInfo) -> i64 {
    info.fields
        .get("renders")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0)
}

/// Runs `frames` render+step frames and returns draws counted per frame.
fn draws_per_frame(env: &mut GymBridgeEnv, frames: usize) -> Vec<i64> {
    let (_, info) = env.reset().unwrap();
    let mut last = renders(&info);
    let mut per_frame = Vec::new();
    for _ in 0..frames {
        env.render().unwrap();
        let step = env.step(DiscreteAction(2)).unwrap();
        let now = renders(&step.info);
        per_frame.push(now - last);
        last = now;
    }
    per_frame
}

#[test]
fn test_python_bridge_draws_once_per_frame() {
    if !python_available() {
        eprintln!("python3 not found, skipping");
        return;
    }
    let modules = tempfile::tempdir().unwrap();
    std::fs::write(modules.path().join("gymnasium.py"), GYMNASIUM_STUB).unwrap();

    for render_mode in ["human", "rgb_array"] {
        let config = python_bridge_config(modules.path(), render_mode);
        let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config).unwrap();
        assert_eq!(env.action_space().map(|s| s.n), Some(4));

        assert_eq!(draws_per_frame(&mut env, 3), vec![1, 1, 1], "{render_mode}");
        env.close().unwrap();
    }
}

#[test]
fn test_python_bridge_legacy_gym() {
    if !python_available() {
        eprintln!("python3 not found, skipping");
        return;
    }
    let modules = tempfile::tempdir().unwrap();
    std::fs::write(
        modules.path().join("gymnasium.py"),
        "raise ImportError('gymnasium not installed')\n",
    )
    .unwrap();
    std::fs::write(modules.path().join("gym.py"), LEGACY_GYM_STUB).unwrap();

    let config = python_bridge_config(modules.path(), "human");
    let mut env = GymBridgeEnv::spawn("LunarLander-v2", &config).unwrap();
    assert_eq!(env.action_space().map(|s| s.n), Some(4));

    assert_eq!(draws_per_frame(&mut env, 3), vec![1, 1, 1]);

    let step = env.step(DiscreteAction(0)).unwrap();
    assert_eq!(step.observation.data, vec![0.0, 1.3]);
    assert_eq!(step.info.fields.get("mode"), Some(&serde_json::json!("human")));
    assert!(!step.truncated);
    env.close().unwrap();
}
