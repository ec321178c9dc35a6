use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A seeded patient record as stored in the record document.
///
/// Keys the panel does not edit (source system ids, consent flags, ...)
/// are kept in `extra` so a load/save cycle never drops them. The order the
/// keys were read in is remembered and reused when the record is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "serde_json::Map<String, serde_json::Value>",
    into = "serde_json::Map<String, serde_json::Value>"
)]
pub struct PatientRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub demographic_string: String,
    pub additional_context: String,
    pub current_medications: String,
    pub allergies: String,
    pub past_medical_history: String,
    pub extra: Map<String, Value>,
    key_order: Vec<String>,
}

/// Key order is presentation only.
impl PartialEq for PatientRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.birth_date == other.birth_date
            && self.gender == other.gender
            && self.phone == other.phone
            && self.email == other.email
            && self.demographic_string == other.demographic_string
            && self.additional_context == other.additional_context
            && self.current_medications == other.current_medications
            && self.allergies == other.allergies
            && self.past_medical_history == other.past_medical_history
            && self.extra == other.extra
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<String, String> {
    match map.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!("field `{key}` must be a string, found {other}")),
        None => Err(format!("missing field `{key}`")),
    }
}

impl TryFrom<Map<String, Value>> for PatientRecord {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let key_order = map.keys().cloned().collect();
        Ok(Self {
            id: take_string(&mut map, "id")?,
            first_name: take_string(&mut map, "first_name")?,
            last_name: take_string(&mut map, "last_name")?,
            birth_date: take_string(&mut map, "birth_date")?,
            gender: take_string(&mut map, "gender")?,
            phone: take_string(&mut map, "phone")?,
            email: take_string(&mut map, "email")?,
            demographic_string: take_string(&mut map, "demographic_string")?,
            additional_context: take_string(&mut map, "additional_context")?,
            current_medications: take_string(&mut map, "current_medications")?,
            allergies: take_string(&mut map, "allergies")?,
            past_medical_history: take_string(&mut map, "past_medical_history")?,
            extra: map,
            key_order,
        })
    }
}

impl From<PatientRecord> for Map<String, Value> {
    fn from(record: PatientRecord) -> Self {
        let mut named: Vec<(&str, Option<String>)> = vec![
            ("id", Some(record.id)),
            ("first_name", Some(record.first_name)),
            ("last_name", Some(record.last_name)),
            ("birth_date", Some(record.birth_date)),
            ("gender", Some(record.gender)),
            ("phone", Some(record.phone)),
            ("email", Some(record.email)),
            ("demographic_string", Some(record.demographic_string)),
            ("additional_context", Some(record.additional_context)),
            ("current_medications", Some(record.current_medications)),
            ("allergies", Some(record.allergies)),
            ("past_medical_history", Some(record.past_medical_history)),
        ];
        let mut extra = record.extra;
        let mut out = Map::new();

        for key in record.key_order {
            let value = match named.iter_mut().find(|(name, _)| *name == key) {
                Some((_, slot)) => slot.take().map(Value::String),
                None => extra.remove(&key),
            };
            if let Some(value) = value {
                out.insert(key, value);
            }
        }

        // Keys not seen at load time: named fields first, then extras.
        for (name, value) in named {
            if let Some(value) = value {
                out.insert(name.to_string(), Value::String(value));
            }
        }
        out.extend(extra);
        out
    }
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Single-character gender code used in the demographic line.
    pub fn gender_code(&self) -> char {
        if self.gender == "male" {
            'M'
        } else {
            'F'
        }
    }

    /// Rebuild `demographic_string` from the current name, gender and birth date.
    pub fn refresh_demographic(&mut self) {
        self.demographic_string = format!(
            "{}, {}, {}",
            self.full_name(),
            self.gender_code(),
            self.birth_date
        );
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str, first: &str, last: &str, gender: &str) -> PatientRecord {
    let mut record = PatientRecord {
        id: id.into(),
        first_name: first.into(),
        last_name: last.into(),
        birth_date: "1990-01-01".into(),
        gender: gender.into(),
        phone: "555-0100".into(),
        email: format!("{}@example.com", first.to_lowercase()),
        demographic_string: String::new(),
        additional_context: String::new(),
        current_medications: "None".into(),
        allergies: "NKDA".into(),
        past_medical_history: String::new(),
        extra: Map::new(),
        key_order: Vec::new(),
    };
    record.refresh_demographic();
    record
}
