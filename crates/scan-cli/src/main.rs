//! CLI del pipeline:
//!   scan run --step <NOMBRE> [--descr <TXT>] [--run <N>] [--init-run <N>]
//!            [--suffix <S>] [--params '<JSON>']
//!   scan runs
//!   scan viz --step <NOMBRE> [--run <N>]
//!
//! Códigos de salida: 2 uso inválido, 4 step/run/parámetro desconocido,
//! 5 error interno (io, registry, fallo del step).

use serde_json::Value;

use scan_core::{PipelineConfig, PipelineContext, PipelineError, Record, StepExecutor};
use scan_steps::{default_catalog, HtmlOverview};

fn main() {
    scan_core::init_dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
        std::process::exit(2);
    }
    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "runs" => cmd_runs(),
        "viz" => cmd_viz(&args[2..]),
        _ => {
            usage();
            std::process::exit(2);
        }
    }
}

fn usage() {
    eprintln!("Uso: scan run --step <NOMBRE> [--descr <TXT>] [--run <N>] [--init-run <N>] [--suffix <S>] [--params '<JSON>']");
    eprintln!("     scan runs");
    eprintln!("     scan viz --step <NOMBRE> [--run <N>]");
}

fn config_or_exit() -> PipelineConfig {
    match PipelineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[scan] config error: {e}");
            std::process::exit(5);
        }
    }
}

/// 2 para fallos de contrato del caller, 5 para el resto.
fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::UnknownStep(_)
        | PipelineError::NotFound { .. }
        | PipelineError::InvalidParameter { .. } => 4,
        _ => 5,
    }
}

fn cmd_run(args: &[String]) {
    let mut step: Option<String> = None;
    let mut descr = String::new();
    let mut run: Option<u32> = None;
    let mut init_run: Option<u32> = None;
    let mut suffix = String::new();
    let mut params = Record::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--step" => {
                i += 1;
                if i < args.len() {
                    step = Some(args[i].clone());
                }
            }
            "--descr" => {
                i += 1;
                if i < args.len() {
                    descr = args[i].clone();
                }
            }
            "--run" => {
                i += 1;
                if i < args.len() {
                    run = args[i].parse().ok();
                }
            }
            "--init-run" => {
                i += 1;
                if i < args.len() {
                    init_run = args[i].parse().ok();
                }
            }
            "--suffix" => {
                i += 1;
                if i < args.len() {
                    suffix = args[i].clone();
                }
            }
            "--params" => {
                i += 1;
                if i < args.len() {
                    match serde_json::from_str::<Value>(&args[i]) {
                        Ok(Value::Object(map)) => params = map,
                        _ => {
                            eprintln!("[scan run] --params debe ser un objeto JSON");
                            std::process::exit(2);
                        }
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    let Some(step) = step else {
        usage();
        std::process::exit(2);
    };

    let config = config_or_exit();
    let ctx = match run {
        Some(r) => PipelineContext::pin(config, r, &descr),
        None => PipelineContext::resume(config, &descr),
    };
    let mut ctx = match ctx {
        Ok(ctx) => ctx.with_init_run(init_run),
        Err(e) => {
            eprintln!("[scan run] {e}");
            std::process::exit(5);
        }
    };

    let catalog = default_catalog();
    let viz = HtmlOverview;
    let mut exec = StepExecutor::new(&catalog, &viz);
    if let Err(e) = exec.run_step(&mut ctx, &step, &params, &suffix) {
        eprintln!("[scan run] {e}");
        std::process::exit(exit_code(&e));
    }
}

fn cmd_runs() {
    let config = config_or_exit();
    let ctx = match PipelineContext::resume(config, "") {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("[scan runs] {e}");
            std::process::exit(5);
        }
    };
    for (run, entry) in ctx.registry().entries() {
        println!("{run}\t{}\t{}", entry.timestamp(), entry.description());
    }
}

fn cmd_viz(args: &[String]) {
    let mut step: Option<String> = None;
    let mut run: Option<u32> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--step" => {
                i += 1;
                if i < args.len() {
                    step = Some(args[i].clone());
                }
            }
            "--run" => {
                i += 1;
                if i < args.len() {
                    run = args[i].parse().ok();
                }
            }
            _ => {}
        }
        i += 1;
    }
    let Some(step) = step else {
        usage();
        std::process::exit(2);
    };

    let config = config_or_exit();
    let ctx = match run {
        Some(r) => PipelineContext::pin(config, r, ""),
        None => PipelineContext::resume(config, ""),
    };
    let mut ctx = match ctx {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("[scan viz] {e}");
            std::process::exit(5);
        }
    };

    let catalog = default_catalog();
    let viz = HtmlOverview;
    let mut exec = StepExecutor::new(&catalog, &viz);
    match exec.visualize_step(&mut ctx, &step) {
        Ok(Some(path)) => println!("{}", path.display()),
        Ok(None) => println!("(sin figuras en {step})"),
        Err(e) => {
            eprintln!("[scan viz] {e}");
            std::process::exit(exit_code(&e));
        }
    }
}
