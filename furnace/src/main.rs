use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use kiln::{BuildMode, Config, Ctx, Pipeline, Step};

use crate::flags::{Dev, DevDefault, Furnace, FurnaceCmd};

mod dev;
mod flags;
mod logger;
mod server;

pub fn main() -> ExitCode {
    let flags = Furnace::from_env_or_exit();
    logger::init(flags.verbose, flags.quiet);

    let start = Instant::now();
    match run(flags) {
        Ok(()) => {
            tracing::info!("done in {}ms", start.elapsed().as_millis());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(flags: Furnace) -> kiln::Result<()> {
    let root = flags.root.unwrap_or_else(|| PathBuf::from("."));
    let mut config = Config::discover(&root)?;
    match flags.subcommand {
        FurnaceCmd::DevDefault(DevDefault { port, host }) | FurnaceCmd::Dev(Dev { port, host }) => {
            config.server.host = host.unwrap_or(config.server.host);
            config.server.port = port.unwrap_or(config.server.port);
            dev::run(root, config)
        }
        FurnaceCmd::Build(_) => {
            let ctx = Ctx::new(&root, &config, BuildMode::Production);
            Pipeline::default().build(&ctx)
        }
        FurnaceCmd::Clean(_) => single(&root, &config, Step::Clean, false),
        FurnaceCmd::Styles(args) => single(&root, &config, Step::Styles, args.prod),
        FurnaceCmd::Scripts(args) => single(&root, &config, Step::Scripts, args.prod),
        FurnaceCmd::Templates(args) => single(&root, &config, Step::Templates, args.prod),
        FurnaceCmd::Images(args) => single(&root, &config, Step::Images, args.prod),
        FurnaceCmd::Fonts(args) => single(&root, &config, Step::Fonts, args.prod),
    }
}

fn single(root: &Path, config: &Config, step: Step, prod: bool) -> kiln::Result<()> {
    let mode = if prod { BuildMode::Production } else { BuildMode::Development };
    Pipeline::default().run(step, &Ctx::new(root, config, mode))
}
