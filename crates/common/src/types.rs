//! Core record types for the Amy data model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Row id of a [`Site`]
    SiteId
);
record_id!(
    /// Row id of an [`Airport`]
    AirportId
);
record_id!(
    /// Row id of a [`Badge`]
    BadgeId
);
record_id!(
    /// Row id of a [`Person`]
    PersonId
);
record_id!(
    /// Row id of an [`Award`]
    AwardId
);

/// Host institution for workshops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub domain: String,
    pub fullname: String,
    pub country: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewSite {
    pub domain: String,
    pub fullname: String,
    pub country: String,
    pub notes: String,
}

/// Airport used to locate people geographically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: AirportId,
    pub iata: String,
    pub fullname: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default)]
pub struct NewAirport {
    pub iata: String,
    pub fullname: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Badge that can be awarded to a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub title: String,
    pub criteria: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewBadge {
    pub name: String,
    pub title: String,
    pub criteria: String,
}

/// Gender code stored on a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "O")]
    Other,
    #[serde(rename = "U")]
    Undisclosed,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Undisclosed
    }
}

impl Gender {
    /// One-letter code as stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::Other => "O",
            Gender::Undisclosed => "U",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F" => Some(Gender::Female),
            "M" => Some(Gender::Male),
            "O" => Some(Gender::Other),
            "U" => Some(Gender::Undisclosed),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Instructor, learner or helper known to Amy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub personal: String,
    pub middle: Option<String>,
    pub family: String,
    pub email: Option<String>,
    pub gender: Gender,
    pub active: bool,
    pub airport: Option<AirportId>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub url: Option<String>,
    pub slug: String,
}

impl Person {
    /// Personal, middle and family names joined with single spaces
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.personal.as_str()];
        if let Some(middle) = self.middle.as_deref() {
            parts.push(middle);
        }
        parts.push(&self.family);
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPerson {
    pub personal: String,
    pub middle: Option<String>,
    pub family: String,
    pub email: Option<String>,
    pub gender: Gender,
    pub active: bool,
    pub airport: Option<AirportId>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub url: Option<String>,
    pub slug: String,
}

/// A badge held by a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: AwardId,
    pub person: PersonId,
    pub badge: BadgeId,
    pub awarded: NaiveDate,
}

/// Tables known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Sites,
    Airports,
    Badges,
    Persons,
    Awards,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Sites => "sites",
            Table::Airports => "airports",
            Table::Badges => "badges",
            Table::Persons => "persons",
            Table::Awards => "awards",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_codes_round_trip() {
        for gender in [Gender::Female, Gender::Male, Gender::Other, Gender::Undisclosed] {
            assert_eq!(Gender::from_code(gender.code()), Some(gender));
        }
        assert_eq!(Gender::from_code("X"), None);
    }

    #[test]
    fn test_full_name_skips_missing_middle() {
        let person = Person {
            id: PersonId(1),
            personal: "Ron".to_string(),
            middle: None,
            family: "Weasley".to_string(),
            email: None,
            gender: Gender::Male,
            active: false,
            airport: None,
            github: None,
            twitter: None,
            url: None,
            slug: "weasley.ron".to_string(),
        };
        assert_eq!(person.full_name(), "Ron Weasley");

        let person = Person {
            middle: Some("Bilius".to_string()),
            ..person
        };
        assert_eq!(person.full_name(), "Ron Bilius Weasley");
    }
}
