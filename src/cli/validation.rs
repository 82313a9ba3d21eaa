use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if args.page_size == Some(0) {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    if args.api_page_size == Some(0) {
        return Err("invalid api-page-size, expected positive integer".to_string());
    }
    if args.movie == Some(0) {
        return Err("invalid movie, expected positive integer".to_string());
    }
    if args.planet == Some(0) {
        return Err("invalid planet, expected positive integer".to_string());
    }
    if args.concurrency == Some(0) {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    if args.workers == Some(0) {
        return Err("invalid workers, expected positive integer".to_string());
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --output-format '{raw}', expected text or json"));
        }
    }
    if let Some(raw) = args.base_url.as_deref() {
        reqwest::Url::parse(raw).map_err(|e| format!("invalid --base-url '{raw}': {e}"))?;
    }
    if args.interactive && args.show.is_some() {
        return Err("use either --interactive or --show, not both".to_string());
    }
    Ok(())
}
