//! The student record and the two shapes a client sends it in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted student. `id` is assigned by storage and never changes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Body of a create request.
///
/// Every field is optional here so a missing field reaches validation as
/// "required" rather than failing the decode. A client-supplied `id` is not a
/// field and is ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

/// Body of an update request: which fields the client supplied, and with
/// what value.
///
/// `None` means "not in the payload", so `{"age": 0}` and `{}` differ.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

impl StudentPatch {
    /// Picks the mutable fields out of a decoded JSON object.
    ///
    /// Entries of the wrong JSON type are skipped, as are unknown keys.
    /// Numeric ages are truncated toward zero.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            name: object.get("name").and_then(Value::as_str).map(str::to_owned),
            email: object.get("email").and_then(Value::as_str).map(str::to_owned),
            age: object.get("age").and_then(truncated_integer),
        }
    }

    /// Overwrites the supplied fields of `student`, leaving the rest alone.
    pub fn apply(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(age) = self.age {
            student.age = age;
        }
    }
}

fn truncated_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number
        .as_i64()
        .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}
