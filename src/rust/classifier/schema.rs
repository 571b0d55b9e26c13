use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::str::FromStr;

use log::{debug, info};

use super::error::ClassifierError;

/// Reserved metadata name that declares the class domain.
pub const CLASS_ENTRY: &str = "class";

/// An ordered, duplicate-free list of discrete values with O(1) lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    values: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Domain {
    fn new(owner: &str, values: Vec<String>) -> Result<Self, ClassifierError> {
        if values.is_empty() {
            return Err(ClassifierError::SchemaError(
                format!("'{}' must declare at least one value", owner)
            ));
        }

        let mut positions = HashMap::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            if value.is_empty() {
                return Err(ClassifierError::SchemaError(
                    format!("'{}' declares an empty value at position {}", owner, i + 1)
                ));
            }
            if positions.insert(value.clone(), i).is_some() {
                return Err(ClassifierError::SchemaError(
                    format!("'{}' declares value '{}' more than once", owner, value)
                ));
            }
        }

        Ok(Self { values, positions })
    }

    /// Position of `value` in declaration order.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.positions.get(value).copied()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.positions.contains_key(value)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named categorical feature and its declared values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub domain: Domain,
}

/// The set of class labels, in metadata order.
pub type ClassDomain = Domain;

/// Attribute layout and class domain parsed from a metadata file.
///
/// Each metadata line has the form `name:v1,v2,...,vn`. Exactly one line
/// must be named `class`; it may appear anywhere in the file. Names and
/// values cannot contain `:` or `,`, so a line with a second `:` is rejected.
///
/// ```
/// use catbayes::Schema;
///
/// let schema: Schema = "doors:2,4\nclass:a,b".parse()?;
/// assert_eq!(schema.num_attributes(), 1);
/// assert_eq!(schema.classes().values(), ["a", "b"]);
/// # Ok::<(), catbayes::ClassifierError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    attributes: Vec<Attribute>,
    classes: ClassDomain,
}

/// One metadata line before the class entry has been located.
#[derive(Debug)]
struct RawEntry {
    line_number: usize,
    name: String,
    values: Vec<String>,
}

impl RawEntry {
    fn parse(line_number: usize, line: &str) -> Result<Self, ClassifierError> {
        let (name, values) = line.split_once(':').ok_or_else(|| {
            ClassifierError::SchemaError(
                format!("line {}: expected 'name:values', found '{}'", line_number, line)
            )
        })?;

        if name.is_empty() {
            return Err(ClassifierError::SchemaError(
                format!("line {}: entry name cannot be empty", line_number)
            ));
        }
        if values.contains(':') {
            return Err(ClassifierError::SchemaError(
                format!("line {}: more than one ':' in '{}'", line_number, line)
            ));
        }

        let values = if values.is_empty() {
            Vec::new()
        } else {
            values.split(',').map(str::to_string).collect()
        };

        Ok(Self {
            line_number,
            name: name.to_string(),
            values,
        })
    }
}

impl Schema {
    /// Builds a schema from metadata lines.
    ///
    /// All lines are parsed first; the attribute tables are only built once
    /// the class entry is known, so the class line may appear at any position.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim_end();
            if line.is_empty() {
                continue;
            }
            entries.push(RawEntry::parse(i + 1, line)?);
        }

        let mut class_entry: Option<RawEntry> = None;
        let mut attribute_entries = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.name == CLASS_ENTRY {
                if let Some(previous) = &class_entry {
                    return Err(ClassifierError::SchemaError(format!(
                        "line {}: duplicate '{}' entry (first declared on line {})",
                        entry.line_number, CLASS_ENTRY, previous.line_number
                    )));
                }
                class_entry = Some(entry);
            } else {
                attribute_entries.push(entry);
            }
        }

        let class_entry = class_entry.ok_or_else(|| {
            ClassifierError::SchemaError(format!("no '{}' entry found in metadata", CLASS_ENTRY))
        })?;
        let classes = Domain::new(CLASS_ENTRY, class_entry.values)?;

        let mut seen = HashSet::with_capacity(attribute_entries.len());
        let mut attributes = Vec::with_capacity(attribute_entries.len());
        for entry in attribute_entries {
            if !seen.insert(entry.name.clone()) {
                return Err(ClassifierError::SchemaError(format!(
                    "line {}: attribute '{}' is declared more than once",
                    entry.line_number, entry.name
                )));
            }
            let domain = Domain::new(&entry.name, entry.values)?;
            debug!("Attribute '{}' has {} values", entry.name, domain.len());
            attributes.push(Attribute { name: entry.name, domain });
        }

        info!(
            "Schema loaded: {} attributes, {} classes",
            attributes.len(),
            classes.len()
        );

        Ok(Self { attributes, classes })
    }

    /// Reads metadata lines from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ClassifierError> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        Self::from_lines(lines)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn classes(&self) -> &ClassDomain {
        &self.classes
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Maps attribute values to their domain positions.
    ///
    /// `values` must hold exactly one value per attribute.
    pub fn encode_values(&self, values: &[&str]) -> Result<Vec<usize>, ClassifierError> {
        if values.len() != self.attributes.len() {
            return Err(ClassifierError::MalformedRecordError(format!(
                "expected {} attribute values, found {}",
                self.attributes.len(),
                values.len()
            )));
        }

        self.attributes
            .iter()
            .zip(values)
            .map(|(attribute, value)| {
                attribute.domain.index_of(value).ok_or_else(|| {
                    ClassifierError::UnknownAttributeValueError {
                        attribute: attribute.name.clone(),
                        value: value.to_string(),
                    }
                })
            })
            .collect()
    }
}

impl FromStr for Schema {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_lines(s.lines())
    }
}
