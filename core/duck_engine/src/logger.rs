use std::io::Write;

use env_logger::{Builder, Env, Target};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn,duck_engine=info,voice_duck=info";

/// Installs the global logger, writing `[LEVEL] target: message` lines to stderr.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Stderr)
        .init();
}
