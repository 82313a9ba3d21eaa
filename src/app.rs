use std::io::Write;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::commands::{self, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, OutputFormat};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::session::{Session, Status};
use crate::source::{self, Endpoints, HttpTransport, RecordSource};

fn print_banner() {
    const BANNER: &str = r#"
    __          __          __
   / /_  ____  / /___  ____/ /_  _________ _      __________
  / __ \/ __ \/ / __ \/ __  / / / / ___/ __ \ | /| / / ___/ _ \
 / / / / /_/ / / /_/ / /_/ / /_/ / /  / /_/ / |/ |/ (__  )  __/
/_/ /_/\____/_/\____/_.___/\__,_/_/   \____/|__/|__/____/\___/
       v0.1.0 - star wars character browser
    "#;
    eprint!("{}", BANNER);
    eprintln!();
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn print_error(message: &str) {
    eprintln!(
        "{}{}{} {}",
        "[".bold().white(),
        "ERR".bold().red(),
        "]".bold().white(),
        message
    );
}

fn print_warning(message: &str) {
    eprintln!(
        "{}{}{} {}",
        "[".bold().white(),
        "WRN".bold().yellow(),
        "]".bold().white(),
        message
    );
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "holobrowse=warn",
        1 => "holobrowse=info",
        _ => "holobrowse=debug",
    };
    let filter =
        EnvFilter::try_from_env("HOLOBROWSE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    endpoints: Endpoints,
    page_size: usize,
    api_page_size: usize,
    concurrency: usize,
    max_pages: usize,
    rate: u32,
    timeout: usize,
    workers: usize,
    proxy: Option<String>,
    no_color: bool,
    verbose: u8,
    output_format: OutputFormat,
    search: Option<String>,
    movie: Option<usize>,
    planet: Option<usize>,
    page: Option<usize>,
    list_movies: bool,
    list_planets: bool,
    show: Option<String>,
    interactive: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| source::DEFAULT_BASE_URL.to_string());
    reqwest::Url::parse(&base_url).map_err(|e| format!("invalid base_url '{base_url}': {e}"))?;
    let endpoints = Endpoints::from_base(
        &base_url,
        cfg.people_path.as_deref().unwrap_or("people"),
        cfg.films_path.as_deref().unwrap_or("films"),
        cfg.planets_path.as_deref().unwrap_or("planets"),
    );

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }
    let api_page_size = args
        .api_page_size
        .or(cfg.api_page_size)
        .unwrap_or(source::DEFAULT_API_PAGE_SIZE);
    if api_page_size == 0 {
        return Err("invalid api_page_size, expected positive integer".to_string());
    }
    let concurrency = args
        .concurrency
        .or(cfg.concurrency)
        .unwrap_or(source::DEFAULT_CONCURRENCY);
    if concurrency == 0 {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    let max_pages = cfg.max_pages.unwrap_or(source::DEFAULT_MAX_PAGES);
    if max_pages == 0 {
        return Err("invalid max_pages, expected positive integer".to_string());
    }
    let rate = args.rate.or(cfg.rate).unwrap_or(0);
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let workers = args.workers.or(cfg.workers).unwrap_or(2).max(1);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let output_format_raw = args
        .output_format
        .or(cfg.output_format)
        .unwrap_or_else(|| "text".to_string());
    let output_format = OutputFormat::parse(&output_format_raw)
        .ok_or_else(|| format!("invalid output_format '{output_format_raw}', expected text or json"))?;

    Ok(RunConfig {
        endpoints,
        page_size,
        api_page_size,
        concurrency,
        max_pages,
        rate,
        timeout,
        workers,
        proxy,
        no_color,
        verbose: args.verbose,
        output_format,
        search: args.search,
        movie: args.movie,
        planet: args.planet,
        page: args.page,
        list_movies: args.list_movies,
        list_planets: args.list_planets,
        show: args.show,
        interactive: args.interactive,
    })
}

/// Applies the filters given on the command line in the same order a user
/// would: search, movie, planet, then page.
fn apply_initial_filters(session: &mut Session, run: &RunConfig) -> Result<(), String> {
    if let Some(text) = run.search.as_deref() {
        session.on_text_filter_change(text);
    }
    if run.movie.is_some() {
        session
            .on_movie_selected(run.movie)
            .map_err(|e| format!("invalid --movie: {e}"))?;
    }
    if run.planet.is_some() {
        session
            .on_planet_selected(run.planet)
            .map_err(|e| format!("invalid --planet: {e}"))?;
    }
    if let Some(page) = run.page {
        let effective = session.on_page_change(page.saturating_sub(1));
        if effective + 1 != page {
            print_warning(&format!(
                "page {page} is out of range, showing page {}",
                effective + 1
            ));
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Reply {
    Render,
    Text(String),
    Error(String),
    Quit,
}

fn apply_command(session: &mut Session, command: Command) -> Reply {
    match command {
        Command::Search(text) => {
            session.on_text_filter_change(&text);
            Reply::Render
        }
        Command::Movie(ordinal) => match session.on_movie_selected(ordinal) {
            Ok(()) => Reply::Render,
            Err(e) => Reply::Error(e.to_string()),
        },
        Command::Planet(ordinal) => match session.on_planet_selected(ordinal) {
            Ok(()) => Reply::Render,
            Err(e) => Reply::Error(e.to_string()),
        },
        Command::Page(page) => {
            session.on_page_change(page.saturating_sub(1));
            Reply::Render
        }
        Command::Next => {
            session.on_next_page();
            Reply::Render
        }
        Command::Prev => {
            session.on_previous_page();
            Reply::Render
        }
        Command::Reset => {
            session.on_reset_filters();
            Reply::Render
        }
        Command::Movies => match session.movies() {
            Some(movies) => Reply::Text(output::render_movies(movies)),
            None => Reply::Error(reference_unavailable(session)),
        },
        Command::Planets => match session.planets() {
            Some(planets) => Reply::Text(output::render_planets(planets)),
            None => Reply::Error(reference_unavailable(session)),
        },
        Command::Show(name) => match session.person(&name) {
            Some(person) => Reply::Text(output::render_detail(person)),
            None => Reply::Error(format!("no character named '{name}'")),
        },
        Command::View => Reply::Render,
        Command::Help => Reply::Text(format!("{}\n", commands::HELP)),
        Command::Quit => Reply::Quit,
    }
}

fn reference_unavailable(session: &Session) -> String {
    match session.reference_error() {
        Some(e) => format!("movie and planet lists are unavailable: {e}"),
        None => "movie and planet lists are not loaded".to_string(),
    }
}

fn write_view<W: Write>(out: &mut W, session: &Session, format: OutputFormat) -> std::io::Result<()> {
    let view = session.derived_view();
    match format {
        OutputFormat::Text => write!(out, "{}", output::render_text(&view)),
        OutputFormat::Json => {
            out.write_all(&output::render_json(&view))?;
            writeln!(out)
        }
    }
}

fn print_view(session: &Session, format: OutputFormat) -> Result<(), String> {
    write_view(&mut std::io::stdout(), session, format)
        .map_err(|e| format!("failed to write output: {e}"))
}

/// Reads commands from `input` until EOF or `quit`. Views and command output
/// go to `out`; the prompt goes to `prompt` so it never mixes into JSON.
async fn run_interactive<R, W, P>(
    session: &mut Session,
    format: OutputFormat,
    input: R,
    out: &mut W,
    prompt: &mut P,
) -> Result<(), String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    P: Write,
{
    let write_err = |e: std::io::Error| format!("failed to write output: {e}");
    write_view(out, session, format).map_err(write_err)?;
    let mut lines = input.lines();
    loop {
        write!(prompt, "{} ", ">".bold().yellow())
            .and_then(|_| prompt.flush())
            .map_err(|e| format!("failed to write prompt: {e}"))?;
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read command: {e}")),
        };
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                print_error(&e);
                continue;
            }
        };
        match apply_command(session, command) {
            Reply::Render => write_view(out, session, format).map_err(write_err)?,
            Reply::Text(text) => write!(out, "{}", text).map_err(write_err)?,
            Reply::Error(e) => print_error(&e),
            Reply::Quit => break,
        }
        out.flush().map_err(write_err)?;
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    init_tracing(run.verbose);
    if run.output_format == OutputFormat::Text {
        print_banner();
        format_kv_line("API", &run.endpoints.people);
        format_kv_line("Page size", &run.page_size.to_string());
    }

    let transport =
        HttpTransport::build(run.proxy.as_deref(), run.timeout).map_err(|e| e.to_string())?;
    let source = RecordSource::new(transport)
        .with_api_page_size(run.api_page_size)
        .with_concurrency(run.concurrency)
        .with_max_pages(run.max_pages)
        .with_rate(run.rate);

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress style: {e}"))?,
    );
    pb.set_message("loading characters");

    let mut session = Session::new(run.page_size);
    session.load(&source, &run.endpoints).await;
    pb.finish_and_clear();

    if session.status() == Status::Failed {
        let view = session.derived_view();
        let message = view.error_message.unwrap_or(crate::session::LOAD_FAILED_MESSAGE);
        return Err(message.to_string());
    }
    if let Some(e) = session.reference_error() {
        print_warning(&format!("movie and planet filters are unavailable: {e}"));
    }

    apply_initial_filters(&mut session, &run)?;

    if run.list_movies {
        match session.movies() {
            Some(movies) => print!("{}", output::render_movies(movies)),
            None => print_error(&reference_unavailable(&session)),
        }
    }
    if run.list_planets {
        match session.planets() {
            Some(planets) => print!("{}", output::render_planets(planets)),
            None => print_error(&reference_unavailable(&session)),
        }
    }

    if run.interactive {
        return run_interactive(
            &mut session,
            run.output_format,
            BufReader::new(tokio::io::stdin()),
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
        .await;
    }

    if let Some(name) = run.show.as_deref() {
        let person = session
            .person(name)
            .ok_or_else(|| format!("no character named '{name}'"))?;
        match run.output_format {
            OutputFormat::Text => print!("{}", output::render_detail(person)),
            OutputFormat::Json => {
                println!("{}", String::from_utf8_lossy(&output::render_json(person)))
            }
        }
        return Ok(());
    }

    if !run.list_movies && !run.list_planets {
        print_view(&session, run.output_format)?;
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.as_deref().map(config::expand_tilde);

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("wrote default config to {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

pub fn report_error(message: &str) {
    print_error(message);
}
