//! Known first names and diminutive aliases

use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Corpus shipped with the crate, one name per line
const BUNDLED_CORPUS: &str = include_str!("../data/italian_names.txt");

/// Minimal set of common Italian first names used when no corpus can be read
pub const FALLBACK_NAMES: &[&str] = &[
    // male
    "mario", "giuseppe", "antonio", "giovanni", "francesco", "luigi", "andrea",
    "roberto", "stefano", "paolo", "giorgio", "matteo", "federico", "carlo",
    "lorenzo", "marco", "luca", "massimo", "valerio", "vincenzo", "vince",
    "alberto", "alessio", "angelo", "alessandro", "claudio", "daniele", "david",
    "emanuele", "fabio", "filippo", "gabriele", "gianfranco", "gianmarco",
    "iacopo", "ignazio", "leonardo", "nicola", "pietro", "riccardo", "salvatore",
    "simone", "tommaso", "umberto", "vittorio",
    // female
    "maria", "anna", "lucia", "giovanna", "rosa", "angela", "sofia", "giulia",
    "francesca", "laura", "alessandra", "elena", "valentina", "martina", "chiara",
    "simona", "monica", "alessia", "cristina", "elisa", "michela", "genny", "rita",
    "margherita", "sabrina", "veronique", "catia", "federica", "elisabetta", "eli",
    "rossella", "natalia", "cinzia", "paola", "morgana", "beatrice", "carolina",
    "daria", "eleonora", "fiamma", "giada", "ilaria", "alice", "letizia", "marica",
    "noemi", "ombretta", "patrizia", "rachele", "sara", "teresa", "ursula", "viola",
    "roberta", "serena", "silvia", "tania", "tiziana", "vanessa", "stella",
];

/// Informal short forms and the full name they stand for
pub const DIMINUTIVES: &[(&str, &str)] = &[
    ("ale", "alessandro"),
    ("aly", "alessandra"),
    ("bea", "beatrice"),
    ("beppe", "giuseppe"),
    ("caro", "carolina"),
    ("cri", "cristina"),
    ("dani", "daniele"),
    ("eli", "elisabetta"),
    ("ele", "elena"),
    ("fede", "federica"),
    ("francy", "francesca"),
    ("gabri", "gabriele"),
    ("gian", "gianni"),
    ("gianni", "giovanni"),
    ("giò", "giovanni"),
    ("giuly", "giulia"),
    ("ila", "ilaria"),
    ("kekka", "francesca"),
    ("laura", "laura"),
    ("leo", "leonardo"),
    ("lori", "lorenzo"),
    ("mari", "maria"),
    ("matte", "matteo"),
    ("miki", "michele"),
    ("moni", "monica"),
    ("morgana", "morgana"),
    ("naty", "natalia"),
    ("nico", "nicola"),
    ("nino", "antonino"),
    ("patty", "patrizia"),
    ("pier", "pierluigi"),
    ("pino", "giuseppe"),
    ("rico", "riccardo"),
    ("rino", "salvatore"),
    ("roby", "roberto"),
    ("ross", "rossella"),
    ("sandro", "alessandro"),
    ("sara", "sara"),
    ("simo", "simona"),
    ("sofi", "sofia"),
    ("stefy", "stefania"),
    ("tere", "teresa"),
    ("tina", "cristina"),
    ("tino", "valentino"),
    ("tom", "tommaso"),
    ("tony", "antonio"),
    ("umb", "umberto"),
    ("vale", "valentina"),
    ("vany", "vanessa"),
    ("vitto", "vittorio"),
];

/// Immutable lookup table of known first names.
///
/// Names are stored case-folded and trimmed. Lookups normalize the candidate
/// the same way, so membership is case-insensitive.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    names: HashSet<String>,
    diminutives: HashMap<String, String>,
}

/// Outcome of loading a registry from a corpus file
#[derive(Debug, Clone)]
pub struct RegistryLoad {
    pub registry: NameRegistry,

    /// Set when the corpus was unavailable and [`FALLBACK_NAMES`] was used
    pub used_fallback: bool,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

impl NameRegistry {
    /// Build a registry from arbitrary names, with the default diminutive table.
    ///
    /// Blank entries are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| normalize(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();

        let diminutives = DIMINUTIVES
            .iter()
            .map(|(short, full)| ((*short).to_string(), (*full).to_string()))
            .collect();

        Self { names, diminutives }
    }

    /// Replace the diminutive table
    #[must_use]
    pub fn with_diminutives<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.diminutives = aliases
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()), normalize(v.as_ref())))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        self
    }

    /// The hard-coded fallback set
    #[must_use]
    pub fn fallback() -> Self {
        Self::from_names(FALLBACK_NAMES)
    }

    /// The corpus compiled into the crate
    #[must_use]
    pub fn bundled() -> Self {
        Self::parse_corpus(BUNDLED_CORPUS)
    }

    /// Build from newline-separated corpus text
    #[must_use]
    pub fn parse_corpus(content: &str) -> Self {
        Self::from_names(content.lines())
    }

    /// Load a corpus file, degrading to [`FALLBACK_NAMES`] when it cannot be
    /// read or contains no names.
    pub fn load(path: impl AsRef<Path>) -> RegistryLoad {
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let registry = Self::parse_corpus(&content);
                if registry.is_empty() {
                    warn!(path = %path.display(), "name corpus is empty, using fallback names");
                    return Self::fallback_load();
                }
                info!(path = %path.display(), names = registry.len(), "name corpus loaded");
                RegistryLoad {
                    registry,
                    used_fallback: false,
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read name corpus, using fallback names");
                Self::fallback_load()
            }
        }
    }

    fn fallback_load() -> RegistryLoad {
        RegistryLoad {
            registry: Self::fallback(),
            used_fallback: true,
        }
    }

    /// Case-insensitive, trimmed membership test
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        !candidate.is_empty() && self.names.contains(&normalize(candidate))
    }

    #[must_use]
    pub fn is_diminutive(&self, candidate: &str) -> bool {
        self.resolve_diminutive(candidate).is_some()
    }

    /// Full name a diminutive stands for, if known.
    ///
    /// The target is returned as stored; it is not checked against the
    /// known-names set.
    #[must_use]
    pub fn resolve_diminutive(&self, candidate: &str) -> Option<&str> {
        if candidate.is_empty() {
            return None;
        }
        self.diminutives
            .get(&normalize(candidate))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the normalized names, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}
