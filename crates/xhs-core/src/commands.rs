//! Static command table, inbound text grammar and typo suggestions.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::{domain::Language, prompts};

pub type PromptBuilder = fn(&str, Language) -> String;

#[derive(Clone, Copy)]
pub enum CommandKind {
    /// One generator call for the argument.
    Generate(PromptBuilder),
    /// Runs the wrapped single-topic command once per comma-separated topic.
    Batch(&'static CommandSpec),
    Search,
    History,
    Menu,
    Help,
    Export,
    CoverHint,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub argument_required: bool,
    pub kind: CommandKind,
    /// Overrides the configured generation bound.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("argument_required", &self.argument_required)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PartialEq for CommandSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

const fn generate(name: &'static str, builder: PromptBuilder) -> CommandSpec {
    CommandSpec {
        name,
        argument_required: true,
        kind: CommandKind::Generate(builder),
        timeout: None,
    }
}

const fn local(name: &'static str, argument_required: bool, kind: CommandKind) -> CommandSpec {
    CommandSpec {
        name,
        argument_required,
        kind,
        timeout: None,
    }
}

const TITLE: CommandSpec = generate("title", prompts::title);

pub static COMMANDS: &[CommandSpec] = &[
    TITLE,
    generate("post", prompts::post),
    generate("tags", prompts::tags),
    generate("cover", prompts::cover),
    generate("covertext", prompts::covertext),
    CommandSpec {
        name: "batch",
        argument_required: true,
        kind: CommandKind::Batch(&TITLE),
        timeout: None,
    },
    CommandSpec {
        timeout: Some(Duration::from_secs(90)),
        ..generate("abtest", prompts::abtest)
    },
    generate("reply", prompts::reply),
    CommandSpec {
        timeout: Some(Duration::from_secs(30)),
        ..generate("hook", prompts::hook)
    },
    // Empty keywords get their own message, so no gate here.
    local("search", false, CommandKind::Search),
    local("history", false, CommandKind::History),
    local("menu", false, CommandKind::Menu),
    local("start", false, CommandKind::Menu),
    local("xhs-help", false, CommandKind::Help),
    local("export", true, CommandKind::Export),
    local("coverhint", true, CommandKind::CoverHint),
];

/// Near-miss spellings and what they most likely meant.
static TYPOS: &[(&str, &str)] = &[
    ("hool", "hook"),
    ("hoook", "hook"),
    ("titel", "title"),
    ("tilte", "title"),
    ("titl", "title"),
    ("pots", "post"),
    ("psot", "post"),
    ("tag", "tags"),
    ("tgas", "tags"),
    ("covr", "cover"),
    ("cvoer", "cover"),
    ("covertxt", "covertext"),
    ("bach", "batch"),
    ("btach", "batch"),
    ("abtset", "abtest"),
    ("ab", "abtest"),
    ("replay", "reply"),
    ("repyl", "reply"),
    ("serach", "search"),
    ("seach", "search"),
    ("histroy", "history"),
    ("hisotry", "history"),
    ("menue", "menu"),
    ("mnu", "menu"),
    ("help", "xhs-help"),
    ("xhshelp", "xhs-help"),
    ("exprot", "export"),
];

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

pub fn suggest(name: &str) -> Option<&'static str> {
    TYPOS
        .iter()
        .find(|(typo, _)| *typo == name)
        .map(|(_, fixed)| *fixed)
}

/// A leading `/command` token and its optional argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Lowercased, without the slash or `@botname`.
    pub command: String,
    /// Trimmed; `None` when absent or blank.
    pub argument: Option<String>,
}

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^/([A-Za-z][A-Za-z0-9_-]*)(?:@[A-Za-z0-9_]+)?(?:\s+(.*))?$")
            .expect("valid regex")
    })
}

pub fn parse(text: &str) -> Option<Invocation> {
    let caps = command_re().captures(text.trim())?;
    let command = caps.get(1)?.as_str().to_lowercase();
    let argument = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some(Invocation { command, argument })
}

/// What the router should do with a piece of text.
#[derive(Debug, PartialEq)]
pub enum Route {
    Command {
        spec: &'static CommandSpec,
        argument: Option<String>,
    },
    DidYouMean(&'static str),
    Ignore,
}

pub fn route(text: &str) -> Route {
    let Some(inv) = parse(text) else {
        return Route::Ignore;
    };
    if let Some(spec) = lookup(&inv.command) {
        return Route::Command {
            spec,
            argument: inv.argument,
        };
    }
    match suggest(&inv.command) {
        Some(fixed) => Route::DidYouMean(fixed),
        None => Route::Ignore,
    }
}

/// Split a batch argument on ASCII or full-width commas and newlines,
/// dropping blanks.
pub fn split_batch(argument: &str) -> Vec<String> {
    argument
        .split([',', '，', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_argument() {
        assert_eq!(
            parse("/title  奶茶店开业 "),
            Some(Invocation {
                command: "title".into(),
                argument: Some("奶茶店开业".into()),
            })
        );
    }

    #[test]
    fn bare_command_and_blank_argument_have_no_argument() {
        assert_eq!(parse("/title").unwrap().argument, None);
        assert_eq!(parse("/title    ").unwrap().argument, None);
    }

    #[test]
    fn strips_bot_mention_and_lowercases() {
        let inv = parse("/TITLE@xhs_helper_bot 咖啡").unwrap();
        assert_eq!(inv.command, "title");
        assert_eq!(inv.argument.as_deref(), Some("咖啡"));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse("hello /title"), None);
        assert_eq!(route("随便聊聊"), Route::Ignore);
    }

    #[test]
    fn multiline_argument_is_kept() {
        let inv = parse("/reply 好看！\n求链接").unwrap();
        assert_eq!(inv.argument.as_deref(), Some("好看！\n求链接"));
    }

    #[test]
    fn typo_routes_to_suggestion() {
        assert_eq!(route("/hool test"), Route::DidYouMean("hook"));
        assert_eq!(route("/nonsense x"), Route::Ignore);
    }

    #[test]
    fn typo_targets_are_known_commands() {
        for (typo, fixed) in TYPOS {
            assert!(lookup(fixed).is_some(), "{typo} -> {fixed}");
            assert!(lookup(typo).is_none(), "{typo} shadows a command");
        }
    }

    #[test]
    fn per_command_timeouts() {
        assert_eq!(lookup("abtest").unwrap().timeout, Some(Duration::from_secs(90)));
        assert_eq!(lookup("hook").unwrap().timeout, Some(Duration::from_secs(30)));
        assert_eq!(lookup("title").unwrap().timeout, None);
    }

    #[test]
    fn hyphenated_command_resolves() {
        match route("/xhs-help") {
            Route::Command { spec, argument } => {
                assert_eq!(spec.name, "xhs-help");
                assert_eq!(argument, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn batch_split_trims_and_drops_empty_segments() {
        assert_eq!(split_batch("奶茶,,咖啡 店"), vec!["奶茶", "咖啡 店"]);
        assert_eq!(split_batch(" a ，b , "), vec!["a", "b"]);
        assert!(split_batch(" , ，").is_empty());
    }

    #[test]
    fn batch_split_accepts_one_topic_per_line() {
        assert_eq!(split_batch("奶茶\n咖啡店\r\n\n面包"), vec!["奶茶", "咖啡店", "面包"]);
    }

    #[test]
    fn batch_runs_the_title_command() {
        match lookup("batch").unwrap().kind {
            CommandKind::Batch(single) => {
                assert_eq!(single.name, "title");
                assert!(matches!(single.kind, CommandKind::Generate(_)));
            }
            _ => panic!("batch is not a batch command"),
        }
    }
}
