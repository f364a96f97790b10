//! Customer accounts (the `members` collection).

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{EntityFields, FieldError, Record};
use crate::types::MemberId;

/// A customer as stored in the `members` collection.
pub type Member = Record<MemberFields>;

/// Editable customer fields.
///
/// `email` holds the raw text as typed; it is validated into an
/// [`Email`](crate::Email) on submit. `password` is only collected when a
/// customer is created and is never rendered: [`value`](EntityFields::value)
/// masks it and `Debug` redacts it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFields {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for MemberFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberFields")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Customer field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberField {
    Username,
    Email,
    Phone,
    Password,
}

impl fmt::Display for MemberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Password => "password",
        })
    }
}

impl EntityFields for MemberFields {
    type Id = MemberId;
    type Field = MemberField;

    const COLLECTION: &'static str = "members";
    const NOUN: &'static str = "customer";
    const FIELDS: &'static [MemberField] = &[
        MemberField::Username,
        MemberField::Email,
        MemberField::Phone,
        MemberField::Password,
    ];

    fn required(creating: bool) -> &'static [MemberField] {
        if creating {
            &[
                MemberField::Username,
                MemberField::Email,
                MemberField::Phone,
                MemberField::Password,
            ]
        } else {
            &[MemberField::Username, MemberField::Email, MemberField::Phone]
        }
    }

    fn value(&self, field: MemberField) -> String {
        match field {
            MemberField::Username => self.username.clone(),
            MemberField::Email => self.email.clone(),
            MemberField::Phone => self.phone.clone(),
            MemberField::Password => self
                .password
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|_| "********".to_owned())
                .unwrap_or_default(),
        }
    }

    fn set(&mut self, field: MemberField, raw: &str) -> Result<(), FieldError> {
        match field {
            MemberField::Username => raw.clone_into(&mut self.username),
            MemberField::Email => raw.trim().clone_into(&mut self.email),
            MemberField::Phone => raw.trim().clone_into(&mut self.phone),
            MemberField::Password => self.password = Some(raw.to_owned()),
        }
        Ok(())
    }
}
