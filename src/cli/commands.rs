/// A line typed in an interactive session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Movie(Option<usize>),
    Planet(Option<usize>),
    /// 1-based page number as typed by the user.
    Page(usize),
    Next,
    Prev,
    Reset,
    Movies,
    Planets,
    Show(String),
    View,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  search <text>      filter by name (empty clears)
  movie <n|none>     filter by movie ordinal
  planet <n|none>    filter by planet ordinal
  page <n>           go to page n
  next | prev        step one page
  reset              clear all filters
  movies | planets   list ordinals
  show <name>        character details
  view               redraw the current page
  help               this text
  quit               leave";

fn parse_selection(kind: &str, arg: &str) -> Result<Option<usize>, String> {
    match arg.to_ascii_lowercase().as_str() {
        "" | "none" | "all" | "-" => Ok(None),
        raw => match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("invalid {kind} '{arg}', expected a positive number or 'none'")),
            Ok(n) => Ok(Some(n)),
        },
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "" => Ok(Self::View),
            "search" | "s" | "/" => Ok(Self::Search(arg.to_string())),
            "movie" | "m" => parse_selection("movie", arg).map(Self::Movie),
            "planet" | "p" => parse_selection("planet", arg).map(Self::Planet),
            "page" | "g" => match arg.parse::<usize>() {
                Ok(0) | Err(_) => Err(format!("invalid page '{arg}', expected a positive number")),
                Ok(n) => Ok(Self::Page(n)),
            },
            "next" | "n" => Ok(Self::Next),
            "prev" | "previous" | "b" => Ok(Self::Prev),
            "reset" => Ok(Self::Reset),
            "movies" => Ok(Self::Movies),
            "planets" => Ok(Self::Planets),
            "show" | "d" => {
                if arg.is_empty() {
                    Err("show needs a character name".to_string())
                } else {
                    Ok(Self::Show(arg.to_string()))
                }
            }
            "view" | "v" => Ok(Self::View),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}
