use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Type alias for entry identifiers
pub type EntryId = Uuid;

/// Type alias for link identifiers
pub type LinkId = Uuid;

/// Type alias for the owning user of entries and links
pub type UserId = Uuid;

const MAX_TEXT_CHARS: usize = 10_000;
const MAX_DESCRIPTION_CHARS: usize = 2_000;
const MAX_TAGS: usize = 32;
const MAX_TAG_CHARS: usize = 64;

/// The five journal categories. The serialized tag is the one stored
/// alongside link endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryVariant {
    /// A grace received.
    #[serde(rename = "grace")]
    Grace,

    /// A prayer, possibly answered later.
    #[serde(rename = "priere")]
    Prayer,

    /// A scripture passage and what it said.
    #[serde(rename = "ecriture")]
    Scripture,

    /// A word of knowledge.
    #[serde(rename = "parole")]
    Word,

    /// A missionary encounter.
    #[serde(rename = "rencontre")]
    Encounter,
}

impl EntryVariant {
    pub const ALL: [EntryVariant; 5] = [
        EntryVariant::Grace,
        EntryVariant::Prayer,
        EntryVariant::Scripture,
        EntryVariant::Word,
        EntryVariant::Encounter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryVariant::Grace => "grace",
            EntryVariant::Prayer => "priere",
            EntryVariant::Scripture => "ecriture",
            EntryVariant::Word => "parole",
            EntryVariant::Encounter => "rencontre",
        }
    }

    /// Human-readable category name.
    pub fn label(self) -> &'static str {
        match self {
            EntryVariant::Grace => "Grâce",
            EntryVariant::Prayer => "Prière",
            EntryVariant::Scripture => "Écriture",
            EntryVariant::Word => "Parole",
            EntryVariant::Encounter => "Rencontre",
        }
    }
}

impl fmt::Display for EntryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grace" => Ok(EntryVariant::Grace),
            "priere" | "prayer" => Ok(EntryVariant::Prayer),
            "ecriture" | "scripture" => Ok(EntryVariant::Scripture),
            "parole" | "word" => Ok(EntryVariant::Word),
            "rencontre" | "encounter" => Ok(EntryVariant::Encounter),
            other => Err(format!("Unknown entry variant '{}'", other)),
        }
    }
}

/// A (variant, id) pair identifying one entry. Link endpoints and graph
/// nodes are matched on both halves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryRef {
    pub variant: EntryVariant,
    pub id: EntryId,
}

impl EntryRef {
    pub fn new(variant: EntryVariant, id: EntryId) -> Self {
        Self { variant, id }
    }

    /// Path of the entry's detail view.
    pub fn path(&self) -> String {
        format!("/entries/{}/{}", self.variant, self.id)
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.variant, self.id)
    }
}

impl FromStr for EntryRef {
    type Err = String;

    /// Parses `variant:uuid`, e.g. `priere:0191...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (variant, id) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected '<variant>:<id>', got '{}'", s))?;
        let variant = variant.parse::<EntryVariant>()?;
        let id = Uuid::parse_str(id.trim()).map_err(|e| format!("Invalid entry id: {}", e))?;
        Ok(Self { variant, id })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grace {
    pub date: NaiveDate,
    pub text: String,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prayer {
    pub date: NaiveDate,
    /// Who or what the prayer is for.
    pub subject: String,
    pub intention: String,
    #[serde(default)]
    pub answered: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scripture {
    pub date: NaiveDate,
    /// Book, chapter and verses, e.g. "Jn 15, 1-8".
    pub reference: String,
    pub passage: String,
    pub meditation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Word {
    pub date: NaiveDate,
    pub content: String,
    pub recipient: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Encounter {
    pub date: NaiveDate,
    pub person: String,
    pub content: String,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Variant-specific content of an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EntryBody {
    #[serde(rename = "grace")]
    Grace(Grace),
    #[serde(rename = "priere")]
    Prayer(Prayer),
    #[serde(rename = "ecriture")]
    Scripture(Scripture),
    #[serde(rename = "parole")]
    Word(Word),
    #[serde(rename = "rencontre")]
    Encounter(Encounter),
}

impl EntryBody {
    pub fn variant(&self) -> EntryVariant {
        match self {
            EntryBody::Grace(_) => EntryVariant::Grace,
            EntryBody::Prayer(_) => EntryVariant::Prayer,
            EntryBody::Scripture(_) => EntryVariant::Scripture,
            EntryBody::Word(_) => EntryVariant::Word,
            EntryBody::Encounter(_) => EntryVariant::Encounter,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EntryBody::Grace(g) => g.date,
            EntryBody::Prayer(p) => p.date,
            EntryBody::Scripture(s) => s.date,
            EntryBody::Word(w) => w.date,
            EntryBody::Encounter(e) => e.date,
        }
    }

    /// The text a list row or a graph tooltip shows for this entry.
    pub fn short_text(&self) -> &str {
        match self {
            EntryBody::Grace(g) => &g.text,
            EntryBody::Prayer(p) => &p.subject,
            EntryBody::Scripture(s) => &s.reference,
            EntryBody::Word(w) => &w.content,
            EntryBody::Encounter(e) => &e.person,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            EntryBody::Grace(g) => g.location.as_deref(),
            EntryBody::Word(w) => w.location.as_deref(),
            EntryBody::Encounter(e) => e.location.as_deref(),
            EntryBody::Prayer(_) | EntryBody::Scripture(_) => None,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            EntryBody::Grace(g) => &g.tags,
            EntryBody::Prayer(p) => &p.tags,
            EntryBody::Scripture(s) => &s.tags,
            EntryBody::Word(w) => &w.tags,
            EntryBody::Encounter(e) => &e.tags,
        }
    }

    /// Free-text fields paired with their names, for validation.
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::new();
        match self {
            EntryBody::Grace(g) => {
                fields.push(("text", g.text.as_str()));
            }
            EntryBody::Prayer(p) => {
                fields.push(("subject", p.subject.as_str()));
                fields.push(("intention", p.intention.as_str()));
            }
            EntryBody::Scripture(s) => {
                fields.push(("reference", s.reference.as_str()));
                fields.push(("passage", s.passage.as_str()));
                if let Some(m) = &s.meditation {
                    fields.push(("meditation", m.as_str()));
                }
            }
            EntryBody::Word(w) => {
                fields.push(("content", w.content.as_str()));
            }
            EntryBody::Encounter(e) => {
                fields.push(("person", e.person.as_str()));
                fields.push(("content", e.content.as_str()));
            }
        }
        fields
    }
}

/// One journal record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier. UUIDv7 for time-sortability.
    pub id: EntryId,

    /// Owner. Reads are always scoped to one user.
    pub user_id: UserId,

    pub created_at: DateTime<Utc>,

    pub body: EntryBody,
}

impl Entry {
    pub fn new(user_id: UserId, body: EntryBody) -> Self {
        Entry {
            id: Uuid::now_v7(),
            user_id,
            created_at: Utc::now(),
            body,
        }
    }

    pub fn variant(&self) -> EntryVariant {
        self.body.variant()
    }

    pub fn entry_ref(&self) -> EntryRef {
        EntryRef::new(self.variant(), self.id)
    }

    pub fn short_text(&self) -> &str {
        self.body.short_text()
    }

    pub fn location(&self) -> Option<&str> {
        self.body.location()
    }

    /// Short text cut to `max_chars` characters, with "..." when cut.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = self.short_text().trim();
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.short_text().trim().is_empty() {
            return Err(format!("{} entry must not be empty", self.variant().label()));
        }

        for (name, value) in self.body.text_fields() {
            if value.chars().count() > MAX_TEXT_CHARS {
                return Err(format!(
                    "Field '{}' exceeds {} characters",
                    name, MAX_TEXT_CHARS
                ));
            }
        }

        let tags = self.body.tags();
        if tags.len() > MAX_TAGS {
            return Err(format!("More than {} tags", MAX_TAGS));
        }
        for tag in tags {
            if tag.trim().is_empty() {
                return Err("Tags must not be empty".to_string());
            }
            if tag.chars().count() > MAX_TAG_CHARS {
                return Err(format!("Tag '{}' exceeds {} characters", tag, MAX_TAG_CHARS));
            }
        }

        Ok(())
    }
}

/// The closed set of relationship kinds between entries. Purely
/// descriptive; no kind changes how a link behaves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A fulfils or answers B ("this grace answered that prayer").
    Exauce,

    /// A accomplishes B.
    Accomplit,

    /// A derives from B.
    Decoule,

    /// A illuminates B.
    Eclaire,

    /// A resonates with B.
    Echo,
}

impl LinkKind {
    pub const ALL: [LinkKind; 5] = [
        LinkKind::Exauce,
        LinkKind::Accomplit,
        LinkKind::Decoule,
        LinkKind::Eclaire,
        LinkKind::Echo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Exauce => "exauce",
            LinkKind::Accomplit => "accomplit",
            LinkKind::Decoule => "decoule",
            LinkKind::Eclaire => "eclaire",
            LinkKind::Echo => "echo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Exauce => "exauce",
            LinkKind::Accomplit => "accomplit",
            LinkKind::Decoule => "découle de",
            LinkKind::Eclaire => "éclaire",
            LinkKind::Echo => "fait écho à",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            LinkKind::Exauce => "🙏",
            LinkKind::Accomplit => "✅",
            LinkKind::Decoule => "🌱",
            LinkKind::Eclaire => "💡",
            LinkKind::Echo => "🔔",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown link kind '{}'", s))
    }
}

/// A directed, typed relationship between two entries, possibly of
/// different variants. Field names on the wire follow the persisted
/// `spiritual_links` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpiritualLink {
    pub id: LinkId,

    pub user_id: UserId,

    #[serde(rename = "element_source_type")]
    pub source_variant: EntryVariant,

    #[serde(rename = "element_source_id")]
    pub source_id: EntryId,

    #[serde(rename = "element_cible_type")]
    pub target_variant: EntryVariant,

    #[serde(rename = "element_cible_id")]
    pub target_id: EntryId,

    #[serde(rename = "type_lien")]
    pub kind: LinkKind,

    #[serde(default)]
    pub description: String,

    pub created_at: DateTime<Utc>,
}

impl SpiritualLink {
    pub fn new(
        user_id: UserId,
        source: EntryRef,
        target: EntryRef,
        kind: LinkKind,
        description: impl Into<String>,
    ) -> Self {
        SpiritualLink {
            id: Uuid::now_v7(),
            user_id,
            source_variant: source.variant,
            source_id: source.id,
            target_variant: target.variant,
            target_id: target.id,
            kind,
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    pub fn source(&self) -> EntryRef {
        EntryRef::new(self.source_variant, self.source_id)
    }

    pub fn target(&self) -> EntryRef {
        EntryRef::new(self.target_variant, self.target_id)
    }

    /// True when the entry id appears on either end.
    pub fn touches(&self, entry_id: EntryId) -> bool {
        self.source_id == entry_id || self.target_id == entry_id
    }

    /// True when the exact (variant, id) pair appears on either end.
    pub fn touches_ref(&self, entry: EntryRef) -> bool {
        self.source() == entry || self.target() == entry
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(format!(
                "Description exceeds {} characters",
                MAX_DESCRIPTION_CHARS
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grace(text: &str) -> EntryBody {
        EntryBody::Grace(Grace {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            text: text.to_string(),
            location: Some("Lourdes".to_string()),
            tags: vec![],
        })
    }

    #[test]
    fn entry_ref_parses_variant_and_id() {
        let id = Uuid::now_v7();
        let parsed: EntryRef = format!("priere:{}", id).parse().unwrap();
        assert_eq!(parsed, EntryRef::new(EntryVariant::Prayer, id));
        assert_eq!(parsed.to_string(), format!("priere:{}", id));
        assert!("priere".parse::<EntryRef>().is_err());
        assert!(format!("psaume:{}", id).parse::<EntryRef>().is_err());
    }

    #[test]
    fn link_serializes_with_store_column_names() {
        let user = Uuid::now_v7();
        let source = EntryRef::new(EntryVariant::Grace, Uuid::now_v7());
        let target = EntryRef::new(EntryVariant::Prayer, Uuid::now_v7());
        let link = SpiritualLink::new(user, source, target, LinkKind::Exauce, "merci");

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["element_source_type"], "grace");
        assert_eq!(json["element_cible_type"], "priere");
        assert_eq!(json["type_lien"], "exauce");
        assert_eq!(json["element_cible_id"], target.id.to_string());
    }

    #[test]
    fn excerpt_cuts_on_characters() {
        let entry = Entry::new(Uuid::now_v7(), grace("Ébloui par la lumière du matin"));
        assert_eq!(entry.excerpt(6), "Ébloui...");
        assert_eq!(entry.excerpt(100), "Ébloui par la lumière du matin");
        assert_eq!(entry.location(), Some("Lourdes"));
    }

    #[test]
    fn validate_rejects_empty_and_oversized_fields() {
        let empty = Entry::new(Uuid::now_v7(), grace("   "));
        assert!(empty.validate().is_err());

        let long = Entry::new(Uuid::now_v7(), grace(&"a".repeat(10_001)));
        assert!(long.validate().is_err());

        let mut tagged = Entry::new(Uuid::now_v7(), grace("ok"));
        if let EntryBody::Grace(g) = &mut tagged.body {
            g.tags = vec!["x".repeat(65)];
        }
        assert!(tagged.validate().is_err());
    }

    #[test]
    fn link_kind_parses_case_insensitively() {
        assert_eq!("Echo".parse::<LinkKind>().unwrap(), LinkKind::Echo);
        assert!("answers".parse::<LinkKind>().is_err());
    }
}
