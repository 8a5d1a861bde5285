//! Decides whether a Netflix title and a Trakt title name the same thing.
//!
//! The two catalogs disagree on accents, casing, punctuation and truncation, so
//! the comparison is retried on progressively normalized versions of both titles.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use traktflix_models::{SearchCandidate, TraktIds, WatchActivity};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// An `i` starting a word, standing in for `¡` ("iAmigos!")
static WORD_STARTING_WITH_I: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[\s\p{P}])i").expect("valid regex"));

// Missing from Trakt titles. "Ready, Aim, Marry Me!" vs "Ready, Aim, Marry Me"
const STRIPPED_CHARS: &[char] = &['!'];

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("not found")]
    NotFound,
}

/// A search result accepted for a [`WatchActivity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Movie(TraktIds),
    Episode(TraktIds),
}

/// Compare a local (Netflix) title with a remote (Trakt) one.
///
/// A local title ending with `...` while the remote one doesn't is truncated, and
/// only needs to be a prefix of the remote title.
pub fn titles_match(local: &str, remote: &str) -> bool {
    let partial = local.ends_with(ELLIPSIS) && !remote.ends_with(ELLIPSIS);
    matches(local, remote, partial)
}

pub fn matches(local: &str, remote: &str, partial: bool) -> bool {
    if are_equal(local, remote, partial) {
        return true;
    }

    // "Beef Consomme" vs "Beef Consommé"
    let mut local = strip_marks(local);
    let mut remote = strip_marks(remote);
    if are_equal(&local, &remote, partial) {
        return true;
    }

    if local.contains('!') || remote.contains('!') {
        // Remote keeps its leading i's: "iiPhone!" must still match "iPhone"
        local = WORD_STARTING_WITH_I.replace_all(&local, "$1").into_owned();
        local = local.replace('¡', "");
        remote = remote.replace('¡', "");
    }

    for c in STRIPPED_CHARS {
        local = local.replace(*c, "");
        remote = remote.replace(*c, "");
    }

    // "Forget Me Now" vs "Forget-Me-Now"
    let local = local.replace(' ', "-");
    let remote = remote.replace(' ', "-");

    are_equal(&local, &remote, partial)
}

fn strip_marks(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

fn are_equal(local: &str, remote: &str, partial: bool) -> bool {
    if partial {
        if local.len() < ELLIPSIS.len() {
            return false;
        }
        return match local.get(..local.len() - ELLIPSIS.len()) {
            Some(prefix) => remote.starts_with(prefix),
            None => false,
        };
    }
    fold_case(local).eq(fold_case(remote))
}

// Per-character folding, so a word-final Σ stays σ. Characters whose case orbit
// has more than two members are mapped to one representative.
fn fold_case(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(|c| match c {
        'ς' => 'σ',
        'ſ' => 's',
        c => c,
    })
}

/// First candidate that matches `activity`.
///
/// Episodes need both the show and the episode title to match, and the season
/// when the activity knows it.
pub fn select_candidate(activity: &WatchActivity, candidates: &[SearchCandidate]) -> Result<Selection, MatchError> {
    candidates
        .iter()
        .find_map(|candidate| match candidate {
            SearchCandidate::Movie { movie } => {
                titles_match(&activity.title, &movie.title).then(|| Selection::Movie(movie.ids.clone()))
            }
            SearchCandidate::Episode { show, episode } => {
                let accepted = titles_match(&activity.title, &show.title)
                    && titles_match(&activity.episode_name, episode.title())
                    && (activity.season == 0 || episode.season == activity.season);
                accepted.then(|| Selection::Episode(episode.ids.clone()))
            }
            SearchCandidate::Other => None,
        })
        .ok_or(MatchError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use traktflix_models::{Episode, Media};

    #[test]
    fn test_matches_examples() {
        assert!(matches("Café", "Cafe", false));
        assert!(matches("Abc!", "Abc", false));
        assert!(matches("Night Of...", "Night Of The Living", true));
        assert!(!matches("Ab", "Abc", true));
    }

    #[test]
    fn test_case_folding_is_per_character() {
        assert!(matches("ΟΔΟΣ", "οδοσ", false));
        assert!(matches("οδος", "ΟΔΟΣ", false));
        assert!(matches("Straße", "STRAßE", false));
        assert!(!matches("Straße", "Strasse", false));
    }

    #[test]
    fn test_titles_match_normalizations() {
        assert!(titles_match("Justice is Blind", "Justice Is Blind"));
        assert!(titles_match("Arrested Development: Beef Consomme", "Arrested Development: Beef Consommé"));
        assert!(titles_match("Ready, Aim, Marry Me!", "Ready, Aim, Marry Me"));
        assert!(titles_match("Arrested Development iAmigos!", "Arrested Development Amigos"));
        assert!(titles_match("¡Amigos!", "Amigos"));
        assert!(titles_match("iiPhone!", "iPhone"));
        assert!(titles_match("Forget Me Now", "Forget-Me-Now"));
        assert!(!titles_match("The Office", "The Officer"));
        assert!(!titles_match("Episode 8", "Episode 9"));
    }

    #[test]
    fn test_leading_i_kept_without_exclamation() {
        assert!(!titles_match("iCarly", "Carly"));
    }

    #[test]
    fn test_partial_applies_to_local_side_only() {
        assert!(titles_match("Night Of...", "Night Of The Living"));
        assert!(!titles_match("Night Of The Living", "Night Of..."));
        // Both truncated: plain comparison
        assert!(titles_match("Night Of...", "Night Of..."));
        // Accented remote, truncated local
        assert!(titles_match("Cafe Soci...", "Café Society"));
    }

    #[test]
    fn test_partial_prefix_is_case_sensitive() {
        assert!(!titles_match("night of...", "Night Of The Living"));
    }

    #[test]
    fn test_partial_too_short() {
        assert!(!matches("..", "...", true));
        assert!(matches("...", "anything", true));
    }

    fn episode_candidate(show: &str, season: u32, title: &str, trakt: u64) -> SearchCandidate {
        SearchCandidate::Episode {
            show: Media { title: show.to_string(), year: None, ids: TraktIds::default() },
            episode: Episode {
                season,
                number: 1,
                title: Some(title.to_string()),
                year: None,
                ids: TraktIds { trakt, ..TraktIds::default() },
            },
        }
    }

    fn movie_candidate(title: &str, trakt: u64) -> SearchCandidate {
        SearchCandidate::Movie {
            movie: Media { title: title.to_string(), year: Some(2023), ids: TraktIds { trakt, ..TraktIds::default() } },
        }
    }

    #[test]
    fn test_select_episode_checks_season() {
        let activity = WatchActivity::episode("Alice in Borderland", "Episode 8", 2);
        let candidates = vec![
            episode_candidate("Alice in Borderland", 1, "Episode 8", 10),
            episode_candidate("Alice in Borderland", 2, "Episode 8", 20),
        ];
        assert_eq!(
            select_candidate(&activity, &candidates),
            Ok(Selection::Episode(TraktIds { trakt: 20, ..TraktIds::default() }))
        );
    }

    #[test]
    fn test_select_episode_with_unknown_season_takes_first() {
        let activity = WatchActivity::episode("Goedam", "Threshold", 0);
        let candidates = vec![
            episode_candidate("Other Show", 1, "Threshold", 5),
            episode_candidate("Goedam", 1, "Threshold", 6),
            episode_candidate("Goedam", 2, "Threshold", 7),
        ];
        assert_eq!(
            select_candidate(&activity, &candidates),
            Ok(Selection::Episode(TraktIds { trakt: 6, ..TraktIds::default() }))
        );
    }

    #[test]
    fn test_select_movie() {
        let activity = WatchActivity::movie("Pain Hustlers");
        let candidates = vec![SearchCandidate::Other, movie_candidate("Pain Hustlers", 812)];
        assert_eq!(
            select_candidate(&activity, &candidates),
            Ok(Selection::Movie(TraktIds { trakt: 812, ..TraktIds::default() }))
        );
    }

    #[test]
    fn test_select_nothing_acceptable() {
        let activity = WatchActivity::episode("Alice in Borderland", "Episode 8", 2);
        let candidates = vec![episode_candidate("Alice in Borderland", 2, "Episode 7", 1)];
        assert_eq!(select_candidate(&activity, &candidates), Err(MatchError::NotFound));
        assert_eq!(select_candidate(&activity, &[]), Err(MatchError::NotFound));
        assert_eq!(MatchError::NotFound.to_string(), "not found");
    }
}
