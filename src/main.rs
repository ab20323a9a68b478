use clap::Parser;
use csv_annotate::cli::Cli;

const EXIT_USAGE: i32 = 1;
const EXIT_FAILURE: i32 = 2;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    if let Err(err) = csv_annotate::run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(EXIT_FAILURE);
    }
}
