use std::env;
use std::io::BufReader;

use quill::{Engine, Quill};

fn main() -> Result<(), anyhow::Error> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();

    let mut engine = match env::var("QUILL_ENGINE").as_deref() {
        Ok("vm") => Engine::Vm,
        _ => Engine::Eval,
    };
    if let Some(pos) = args.iter().position(|a| a == "--vm") {
        args.remove(pos);
        engine = Engine::Vm;
    }

    match args.len() {
        0 => {
            let mut quill = Quill::new(engine);
            let mut input = BufReader::new(std::io::stdin());
            quill.repl(&mut input, &mut std::io::stdout())
        }
        1 => {
            let mut quill = Quill::new(engine);
            let filename = args.pop().unwrap();
            quill.run_file(filename.as_ref())
        }
        _ => {
            let bin_name = env!("CARGO_BIN_NAME");
            println!("Usage: {} [--vm] [script]", bin_name);
            std::process::exit(64);
        }
    }
}
