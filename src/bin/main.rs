use anyhow::{Context, Result, bail};
use flexwm::EXIT_RESTART;
use flexwm::window_manager::WindowManager;
use flexwm::x::X11rbConnection;
use nix::sys::signal::{SigHandler, Signal, signal};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut custom_config_path: Option<PathBuf> = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("flexwm-{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--init" => return init_config(),
            "--config" => match rest.next() {
                Some(path) => custom_config_path = Some(PathBuf::from(path)),
                None => bail!("--config requires a path argument"),
            },
            other => bail!("unknown argument: {other}\nrun `flexwm --help` for usage"),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // children are never waited on, let the kernel reap them
    unsafe { signal(Signal::SIGCHLD, SigHandler::SigIgn) }
        .context("Failed to ignore SIGCHLD")?;

    let config = load_config(custom_config_path)?;
    let conn = X11rbConnection::new().context("Failed to connect to the X server")?;
    let mut wm = WindowManager::new(conn, config).context("Failed to start flexwm")?;

    let code = match wm.run() {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "flexwm stopped");
            return Err(e.into());
        }
    };
    drop(wm);

    if code == EXIT_RESTART {
        use std::os::unix::process::CommandExt;
        info!("restarting");
        let err = std::process::Command::new(&args[0]).args(&args[1..]).exec();
        bail!("Failed to restart: {err}");
    }

    std::process::exit(code)
}

fn load_config(custom_path: Option<PathBuf>) -> Result<flexwm::Config> {
    let config_path = match custom_path {
        Some(path) => path,
        None => {
            let path = get_config_path()?.join("config.ron");
            if !path.exists() {
                info!(?path, "no config file, using the defaults");
                return Ok(flexwm::Config::default());
            }
            path
        }
    };

    let config_str = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {config_path:?}"))?;

    flexwm::config::parse_config(&config_str)
        .with_context(|| format!("Failed to parse RON config {config_path:?}"))
}

fn init_config() -> Result<()> {
    let config_dir = get_config_path()?;
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.ron");
    if config_path.exists() {
        bail!("{config_path:?} already exists, remove it first to start over");
    }
    std::fs::write(&config_path, flexwm::config::TEMPLATE)?;

    println!("Config created at {:?}", config_path);
    println!("  Edit the file and restart flexwm to apply it");

    Ok(())
}

fn get_config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join("flexwm"))
}

fn print_help() {
    println!("flexwm - a dynamic tiling window manager for X11\n");
    println!("USAGE:");
    println!("    flexwm [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --init              Create a commented config.ron in ~/.config/flexwm");
    println!("    --config <PATH>     Use a custom config file");
    println!("    -v, --version       Print version information");
    println!("    -h, --help          Print this help message\n");
    println!("CONFIG:");
    println!("    Location: ~/.config/flexwm/config.ron");
    println!("    Without a config file the built in defaults are used.\n");
    println!("EXIT CODES:");
    println!("    0 quit, 101 poweroff, 102 reboot. Restart re-executes flexwm in place.");
    println!("    Set RUST_LOG (e.g. RUST_LOG=debug) to control logging on stderr.");
}
