use std::process::exit;

fn main() {
    if let Err(e) = holobrowse::app::run_cli() {
        holobrowse::app::report_error(&e);
        exit(1);
    }
}
