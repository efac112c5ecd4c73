//! Component registry en evaluatie-logica.

use std::collections::{BTreeMap, HashMap};

use crate::value::{Value, ValueError};

pub mod coerce;
pub mod curve_analysis;
pub mod vector_field;
pub mod vector_plane;

/// Output-map van een component: pinnickname → waarde.
pub type OutputMap = BTreeMap<String, Value>;

/// Fouttype voor component-evaluaties.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    /// Een generieke fout met een bericht.
    #[error("{0}")]
    Message(String),
    /// Een invoerpin die verplicht is maar ontbreekt.
    #[error("{component} vereist invoer '{pin}'")]
    MissingInput {
        component: &'static str,
        pin: &'static str,
    },
}

impl ComponentError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn missing(component: &'static str, pin: &'static str) -> Self {
        Self::MissingInput { component, pin }
    }
}

impl From<ValueError> for ComponentError {
    fn from(err: ValueError) -> Self {
        Self::new(err.to_string())
    }
}

/// Fout bij het opzetten van de registry; fataal voor de host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("geen component geregistreerd voor '{key}'{}", suggestion_suffix(.suggestion.as_deref()))]
    UnknownComponent {
        key: String,
        suggestion: Option<String>,
    },
    #[error("alias mag niet leeg zijn")]
    EmptyAlias,
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |name| format!(" (bedoelde je '{name}'?)"))
}

/// Resultaat van een component-executie.
pub type ComponentResult = Result<OutputMap, ComponentError>;

/// Trait die alle componentimplementaties dienen te implementeren.
pub trait Component {
    fn evaluate(&self, inputs: &[Value]) -> ComponentResult;
}

/// Beschikbare componenttypen binnen de registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    VectorPlane(vector_plane::ComponentKind),
    VectorField(vector_field::ComponentKind),
    CurveAnalysis(curve_analysis::ComponentKind),
}

impl ComponentKind {
    pub fn evaluate(&self, inputs: &[Value]) -> ComponentResult {
        match self {
            Self::VectorPlane(component) => component.evaluate(inputs),
            Self::VectorField(component) => component.evaluate(inputs),
            Self::CurveAnalysis(component) => component.evaluate(inputs),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::VectorPlane(component) => component.name(),
            Self::VectorField(component) => component.name(),
            Self::CurveAnalysis(component) => component.name(),
        }
    }
}

/// Registry die componentimplementaties opzoekt op GUID of naam.
///
/// De host bouwt de registry expliciet op; er bestaat geen globale tabel.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    by_guid: HashMap<String, ComponentKind>,
    by_name: HashMap<String, ComponentKind>,
}

impl ComponentRegistry {
    /// Lege registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_guid: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registry met alle componenten van deze crate.
    #[must_use]
    pub fn with_default_components() -> Self {
        let mut registry = Self::new();

        for registration in vector_plane::REGISTRATIONS {
            let kind = ComponentKind::VectorPlane(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        for registration in vector_field::REGISTRATIONS {
            let kind = ComponentKind::VectorField(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        for registration in curve_analysis::REGISTRATIONS {
            let kind = ComponentKind::CurveAnalysis(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        registry
    }

    pub fn register_guid(&mut self, guid: impl AsRef<str>, kind: ComponentKind) {
        let key = normalize_guid(guid.as_ref());
        self.by_guid.insert(key, kind);
    }

    pub fn register_names(&mut self, names: &[&str], kind: ComponentKind) {
        for name in names {
            let key = normalize_name(name);
            self.by_name.insert(key, kind);
        }
    }

    /// Koppelt een extra naam aan een bestaand component.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<(), ConfigurationError> {
        if alias.trim().is_empty() {
            return Err(ConfigurationError::EmptyAlias);
        }
        let kind = self.require(target)?;
        log::debug!("registry: alias '{alias}' → {}", kind.name());
        self.by_name.insert(normalize_name(alias), kind);
        Ok(())
    }

    #[must_use]
    pub fn resolve(
        &self,
        guid: Option<&str>,
        name: Option<&str>,
        nickname: Option<&str>,
    ) -> Option<ComponentKind> {
        if let Some(component) = guid.and_then(|guid| self.by_guid.get(&normalize_guid(guid))) {
            return Some(*component);
        }

        if let Some(component) = name.and_then(|name| self.by_name.get(&normalize_name(name))) {
            return Some(*component);
        }

        nickname.and_then(|nickname| self.by_name.get(&normalize_name(nickname)).copied())
    }

    /// Zoekt op GUID of naam; onbekende sleutels geven een suggestie terug.
    pub fn require(&self, key: &str) -> Result<ComponentKind, ConfigurationError> {
        self.resolve(Some(key), Some(key), None)
            .ok_or_else(|| ConfigurationError::UnknownComponent {
                key: key.to_owned(),
                suggestion: self.closest_name(key),
            })
    }

    /// Alle geregistreerde namen en aliassen, gesorteerd.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    fn closest_name(&self, key: &str) -> Option<String> {
        let key = normalize_name(key);
        self.by_name
            .keys()
            .map(|name| (levenshtein::levenshtein(&key, name), name))
            .filter(|(distance, name)| *distance <= 3.max(name.len() / 3))
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, name)| name.clone())
    }
}

fn normalize_guid(guid: &str) -> String {
    guid.trim()
        .trim_matches(|c| c == '{' || c == '}')
        .to_lowercase()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
