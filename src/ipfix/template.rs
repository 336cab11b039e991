//! Template definitions and the process-wide template cache (spec §4.8).
//!
//! Keyed by `(ObservationDomainID, TemplateID)` rather than `TemplateID`
//! alone -- an explicit fix over a known limitation of the source (spec
//! §9), which keys by `TemplateID` only and so can collide across
//! observation domains.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;

/// An enterprise-bit-set IE ID carries its enterprise number as a fourth
/// field in the template entry.
const ENTERPRISE_BIT: u16 = 0x8000;

/// One field in a template: which information element, how many bytes it
/// occupies in a data record, and (if the IE ID's high bit is set) the
/// owning enterprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub information_element_id: u16,
    pub field_length: u16,
    pub enterprise_number: Option<u32>,
}

/// A parsed template: its ID and ordered field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: u16,
    pub fields: Vec<FieldSpec>,
}

/// Parses every template record in a Template Set's body (spec §4.8:
/// "TemplateID(2), FieldCount(2), then FieldCount entries of...").
pub fn parse_template_set(buf: &[u8]) -> Result<Vec<Template>> {
    let mut templates = Vec::new();
    let mut offset = 0;

    while offset + 4 <= buf.len() {
        let id = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
        let field_count = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]);
        offset += 4;

        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            if offset + 4 > buf.len() {
                return Err(crate::error::MasonError::IpfixParse(
                    "truncated template field".into(),
                ));
            }
            let raw_ie = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
            let field_length = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]);
            offset += 4;

            let enterprise_bit_set = raw_ie & ENTERPRISE_BIT != 0;
            let information_element_id = raw_ie & !ENTERPRISE_BIT;

            let enterprise_number = if enterprise_bit_set {
                if offset + 4 > buf.len() {
                    return Err(crate::error::MasonError::IpfixParse(
                        "truncated enterprise number".into(),
                    ));
                }
                let n = u32::from_be_bytes([
                    buf[offset],
                    buf[offset + 1],
                    buf[offset + 2],
                    buf[offset + 3],
                ]);
                offset += 4;
                Some(n)
            } else {
                None
            };

            fields.push(FieldSpec {
                information_element_id,
                field_length,
                enterprise_number,
            });
        }

        templates.push(Template { id, fields });
    }

    Ok(templates)
}

/// Process-wide cache of templates seen so far, keyed by observation
/// domain and template ID.
pub struct TemplateCache {
    templates: Mutex<HashMap<(u32, u16), Template>>,
}

impl TemplateCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            templates: Mutex::new(HashMap::new()),
        }
    }

    /// Records (or replaces) a template under its observation domain.
    pub fn insert(&self, observation_domain_id: u32, template: Template) -> Result<()> {
        self.templates
            .lock()?
            .insert((observation_domain_id, template.id), template);
        Ok(())
    }

    /// Looks up a previously-seen template by observation domain and ID.
    pub fn get(&self, observation_domain_id: u32, template_id: u16) -> Result<Option<Template>> {
        Ok(self
            .templates
            .lock()?
            .get(&(observation_domain_id, template_id))
            .cloned())
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "./template_tests.rs"]
mod tests;
