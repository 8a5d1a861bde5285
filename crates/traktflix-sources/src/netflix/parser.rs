//! Turns a raw viewing activity title into a [`WatchActivity`].
//!
//! Netflix renders episodes as `<Show>: <Show>: "<Episode>"` most of the time, but
//! plenty of shows deviate from that. Rules are tried in order and the first one
//! whose pattern matches exactly once wins.

use regex::Regex;
use std::sync::LazyLock;
use traktflix_models::WatchActivity;

// `<Show>: <Show>: "<Episode>"`
static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(.+): (.+): "(.+)""#).expect("valid regex"));

// `<Show: Name>: <Show: Name>: "<Episode>"`
static SHOW_COLON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"((.+): (.+)): ((.+): (.+)): "(.+)""#).expect("valid regex"));

// `<Show>: Season 2: "<Episode>"`, `<Show>: Limited Series: "<Episode>"`,
// `<Show>: Season 4 Remix: <Season name>: "<Episode>"`...
static SEASON_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(.+): (((Season|Part|Class|Volume) ([0-9]+)((.+)?: .+)?)|(Limited Series)|(Collection)): "(.+)""#,
    )
    .expect("valid regex")
});

// `<Show>: "<Episode>"`
static SHORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^:]+): "([^:]+)""#).expect("valid regex"));

/// A title the generic rules get wrong, mapped by literal prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleOverride {
    pub prefix: &'static str,
    pub title: &'static str,
    pub season: u32,
}

/// Season 2 of Zombieverse swapped its season number for a season name.
pub const TITLE_OVERRIDES: &[TitleOverride] = &[TitleOverride {
    prefix: "Zombieverse: New Blood: ",
    title: "Zombieverse",
    season: 2,
}];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub activity: WatchActivity,
    /// Set when the title was classified by guesswork and deserves a human look.
    pub warning: Option<String>,
}

impl ParsedTitle {
    fn certain(activity: WatchActivity) -> Self {
        Self { activity, warning: None }
    }
}

struct TitleRule {
    name: &'static str,
    apply: fn(&str) -> Option<ParsedTitle>,
}

const RULES: &[TitleRule] = &[
    TitleRule { name: "repeated_name", apply: repeated_name },
    TitleRule { name: "colon_in_name", apply: colon_in_name },
    TitleRule { name: "season_marker", apply: season_marker },
    TitleRule { name: "override", apply: known_override },
    TitleRule { name: "subtitle_as_season", apply: subtitle_as_season },
    TitleRule { name: "unrepeated_name", apply: unrepeated_name },
];

pub fn parse_title(raw: &str) -> ParsedTitle {
    // Episode names are always quoted, movie titles almost never are
    if !raw.contains('"') {
        return ParsedTitle::certain(WatchActivity::movie(raw));
    }

    for rule in RULES {
        if let Some(parsed) = (rule.apply)(raw) {
            tracing::trace!(rule = rule.name, title = raw, "title parsed");
            return parsed;
        }
    }

    ParsedTitle {
        activity: WatchActivity::movie(raw),
        warning: Some(format!("Potentially weird title found: {}. Assuming it's a movie.", raw)),
    }
}

/// Captures of the only match of `pattern`, `None` if it matches zero or several times.
fn single_match<'t>(pattern: &Regex, raw: &'t str) -> Option<regex::Captures<'t>> {
    let mut iter = pattern.captures_iter(raw);
    let first = iter.next()?;
    if iter.next().is_some() {
        return None;
    }
    Some(first)
}

fn group<'t>(caps: &regex::Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str()).unwrap_or_default()
}

fn repeated_name(raw: &str) -> Option<ParsedTitle> {
    let caps = single_match(&DEFAULT_PATTERN, raw)?;
    if group(&caps, 1) != group(&caps, 2) {
        return None;
    }
    Some(ParsedTitle::certain(WatchActivity::episode(group(&caps, 1), group(&caps, 3), 0)))
}

fn colon_in_name(raw: &str) -> Option<ParsedTitle> {
    let caps = single_match(&SHOW_COLON_PATTERN, raw)?;
    if group(&caps, 1) != group(&caps, 4) {
        return None;
    }
    Some(ParsedTitle::certain(WatchActivity::episode(group(&caps, 1), group(&caps, 7), 0)))
}

fn season_marker(raw: &str) -> Option<ParsedTitle> {
    let caps = single_match(&SEASON_PATTERN, raw)?;
    // No number for "Limited Series" and "Collection"
    let season = group(&caps, 5).parse::<u32>().unwrap_or(0);
    Some(ParsedTitle::certain(WatchActivity::episode(group(&caps, 1), group(&caps, 10), season)))
}

fn known_override(raw: &str) -> Option<ParsedTitle> {
    TITLE_OVERRIDES.iter().find_map(|o| {
        let rest = raw.strip_prefix(o.prefix)?;
        Some(ParsedTitle::certain(WatchActivity::episode(o.title, rest.trim_matches('"'), o.season)))
    })
}

fn subtitle_as_season(raw: &str) -> Option<ParsedTitle> {
    let caps = single_match(&DEFAULT_PATTERN, raw)?;
    let (title, episode) = (group(&caps, 1), group(&caps, 3));
    Some(ParsedTitle {
        activity: WatchActivity::episode(title, episode, 0),
        warning: Some(format!(
            "Potentially weird title found: {}. Assuming it's a show named '{}' with an episode named '{}'",
            raw, title, episode
        )),
    })
}

fn unrepeated_name(raw: &str) -> Option<ParsedTitle> {
    let caps = single_match(&SHORT_PATTERN, raw)?;
    Some(ParsedTitle::certain(WatchActivity::episode(group(&caps, 1), group(&caps, 2), 1)))
}
