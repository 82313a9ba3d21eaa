use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "holobrowse",
    version,
    about = "terminal character browser for the Star Wars API",
    long_about = "Holobrowse loads every character from the Star Wars API once, then pages through them with name search and movie/planet filters.\n\nExamples:\n  holobrowse\n  holobrowse --search sky --page 1\n  holobrowse --movie 1 --planet 1 --output-format json\n  holobrowse --interactive\n\nTip: Use --config to persist API and performance settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text or json)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.holobrowse/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'b',
        long = "base",
        visible_alias = "base-url",
        value_name = "URL",
        help_heading = "API",
        help = "API root URL (defaults to https://swapi.dev/api)."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "aps",
        visible_alias = "api-page-size",
        value_name = "N",
        help_heading = "API",
        help = "Page size used by the API listing endpoints."
    )]
    pub api_page_size: Option<usize>,

    #[arg(
        short = 's',
        long = "q",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Browse",
        help = "Only show characters whose name contains TEXT (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'm',
        long = "mv",
        visible_alias = "movie",
        value_name = "N",
        help_heading = "Browse",
        help = "Only show characters appearing in movie N (1-based, see --list-movies)."
    )]
    pub movie: Option<usize>,

    #[arg(
        short = 'p',
        long = "pl",
        visible_alias = "planet",
        value_name = "N",
        help_heading = "Browse",
        help = "Only show residents of planet N (1-based, see --list-planets)."
    )]
    pub planet: Option<usize>,

    #[arg(
        short = 'g',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "Browse",
        help = "Page to show (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'z',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Browse",
        help = "Characters per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "lm",
        visible_alias = "list-movies",
        help_heading = "Browse",
        help = "Print the movie list with ordinals."
    )]
    pub list_movies: bool,

    #[arg(
        long = "lp",
        visible_alias = "list-planets",
        help_heading = "Browse",
        help = "Print the planet list with ordinals."
    )]
    pub list_planets: bool,

    #[arg(
        short = 'd',
        long = "sh",
        visible_alias = "show",
        value_name = "NAME",
        help_heading = "Browse",
        help = "Print the details of one character by name."
    )]
    pub show: Option<String>,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "Browse",
        help = "Start an interactive session reading commands from stdin."
    )]
    pub interactive: bool,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'r',
        long = "rt",
        visible_alias = "rate",
        value_name = "RPS",
        help_heading = "Performance",
        help = "Request rate limit (requests per second, 0 = unlimited)."
    )]
    pub rate: Option<u32>,

    #[arg(
        short = 't',
        long = "cnc",
        visible_alias = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Max in-flight page requests per collection."
    )]
    pub concurrency: Option<usize>,

    #[arg(
        short = 'w',
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,
}
