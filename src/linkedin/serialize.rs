// src/linkedin/serialize.rs
//! Flatten the profile entity graph into the plain JSON tree that gets stored.
//!
//! Keys match the entity field names. Unset optional values become `null`; a
//! leaf experience has `group: null`, a parent has `time`/`description` null.

use serde_json::{json, Map, Value};

use crate::types::{Education, Experience, ExperienceDetail, License, Profile, Project};

/// Plain key/value form of an entity
pub type Record = Map<String, Value>;

pub trait ToRecord {
    fn to_record(&self) -> Record;
}

/// A record is already plain data; serializing it again hands it back as is.
impl ToRecord for Record {
    fn to_record(&self) -> Record {
        self.clone()
    }
}

impl ToRecord for Profile {
    fn to_record(&self) -> Record {
        object(json!({
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "location": self.location,
            "phone_number": self.phone_number,
            "web_page": self.web_page,
            "email": self.email,
            "aptitudes": self.aptitudes,
            "education": records(&self.education),
            "experiences": records(&self.experiences),
            "licences": records(&self.licences),
            "projects": records(&self.projects),
        }))
    }
}

impl ToRecord for Education {
    fn to_record(&self) -> Record {
        object(json!({
            "id": self.id,
            "name": self.name,
            "entity": self.entity,
            "time_start": self.time_start,
            "time_end": self.time_end,
        }))
    }
}

impl ToRecord for Experience {
    fn to_record(&self) -> Record {
        let (time, description, group) = match &self.detail {
            ExperienceDetail::Leaf { time, description } => {
                (json!(time), json!(description), Value::Null)
            }
            ExperienceDetail::Parent { roles } => (Value::Null, Value::Null, records(roles)),
        };

        object(json!({
            "id": self.id,
            "name": self.name,
            "time": time,
            "description": description,
            "group": group,
        }))
    }
}

impl ToRecord for License {
    fn to_record(&self) -> Record {
        object(json!({
            "id": self.id,
            "name": self.name,
            "emitted_by": self.emitted_by,
            "expedition": self.expedition,
        }))
    }
}

impl ToRecord for Project {
    fn to_record(&self) -> Record {
        object(json!({
            "id": self.id,
            "name": self.name,
            "time": self.time,
            "description": self.description,
        }))
    }
}

fn records<T: ToRecord>(items: &[T]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| Value::Object(item.to_record()))
            .collect(),
    )
}

fn object(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
