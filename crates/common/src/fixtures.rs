//! Baseline records every Amy test starts from

use chrono::NaiveDate;
use tracing::debug;

use crate::db::Database;
use crate::types::*;
use crate::{Error, Result};

/// The seeded records, kept so tests can refer to them by name.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub site_alpha: Site,
    pub site_beta: Site,

    pub airport_0_0: Airport,
    pub airport_0_50: Airport,
    pub airport_50_100: Airport,

    pub instructor: Badge,

    pub hermione: Person,
    pub harry: Person,
    pub ron: Person,

    pub hermione_instructor: Award,
}

struct Sites {
    alpha: Site,
    beta: Site,
}

struct Airports {
    a0_0: Airport,
    a0_50: Airport,
    a50_100: Airport,
}

struct People {
    hermione: Person,
    harry: Person,
    ron: Person,
}

impl Fixtures {
    /// Create sites, airports, badges, people and the one award, in that order.
    ///
    /// The first failed insert aborts the whole setup.
    pub fn seed(db: &Database) -> Result<Self> {
        let sites = seed_sites(db)?;
        let airports = seed_airports(db)?;
        let instructor = seed_badges(db)?;
        let people = seed_persons(db, &airports)?;

        let awarded = NaiveDate::from_ymd_opt(2014, 1, 1)
            .ok_or_else(|| Error::InvalidConfig("fixture award date".to_string()))?;
        let hermione_instructor = db.create_award(&people.hermione, &instructor, awarded)?;

        debug!("Seeded baseline fixtures");
        Ok(Self {
            site_alpha: sites.alpha,
            site_beta: sites.beta,
            airport_0_0: airports.a0_0,
            airport_0_50: airports.a0_50,
            airport_50_100: airports.a50_100,
            instructor,
            hermione: people.hermione,
            harry: people.harry,
            ron: people.ron,
            hermione_instructor,
        })
    }

    pub fn sites(&self) -> [&Site; 2] {
        [&self.site_alpha, &self.site_beta]
    }

    pub fn airports(&self) -> [&Airport; 3] {
        [&self.airport_0_0, &self.airport_0_50, &self.airport_50_100]
    }

    pub fn persons(&self) -> [&Person; 3] {
        [&self.hermione, &self.harry, &self.ron]
    }
}

fn seed_sites(db: &Database) -> Result<Sites> {
    let alpha = db.create_site(NewSite {
        domain: "alpha.edu".to_string(),
        fullname: "Alpha Site".to_string(),
        country: "Azerbaijan".to_string(),
        notes: String::new(),
    })?;

    let beta = db.create_site(NewSite {
        domain: "beta.com".to_string(),
        fullname: "Beta Site".to_string(),
        country: "Brazil".to_string(),
        notes: "Notes\nabout\nBrazil\n".to_string(),
    })?;

    Ok(Sites { alpha, beta })
}

fn seed_airports(db: &Database) -> Result<Airports> {
    let airport = |iata: &str, fullname: &str, country: &str, latitude: f64, longitude: f64| {
        db.create_airport(NewAirport {
            iata: iata.to_string(),
            fullname: fullname.to_string(),
            country: country.to_string(),
            latitude,
            longitude,
        })
    };

    Ok(Airports {
        a0_0: airport("AAA", "Airport 0x0", "Albania", 0.0, 0.0)?,
        a0_50: airport("BBB", "Airport 0x50", "Bulgaria", 0.0, 50.0)?,
        a50_100: airport("CCC", "Airport 100x50", "Cameroon", 50.0, 100.0)?,
    })
}

fn seed_badges(db: &Database) -> Result<Badge> {
    db.create_badge(NewBadge {
        name: "instructor".to_string(),
        title: "Software Carpentry Instructor".to_string(),
        criteria: "Worked hard for this".to_string(),
    })
}

fn seed_persons(db: &Database, airports: &Airports) -> Result<People> {
    let hermione = db.create_person(NewPerson {
        personal: "Hermione".to_string(),
        middle: None,
        family: "Granger".to_string(),
        email: Some("hermione@granger.co.uk".to_string()),
        gender: Gender::Female,
        active: true,
        airport: Some(airports.a0_0.id),
        github: Some("herself".to_string()),
        twitter: Some("herself".to_string()),
        url: Some("http://hermione.org".to_string()),
        slug: "granger.h".to_string(),
    })?;

    let harry = db.create_person(NewPerson {
        personal: "Harry".to_string(),
        middle: None,
        family: "Potter".to_string(),
        email: Some("harry@hogwarts.edu".to_string()),
        gender: Gender::Male,
        active: true,
        airport: Some(airports.a0_50.id),
        github: Some("hpotter".to_string()),
        twitter: None,
        url: None,
        slug: "potter.h".to_string(),
    })?;

    let ron = db.create_person(NewPerson {
        personal: "Ron".to_string(),
        middle: None,
        family: "Weasley".to_string(),
        email: Some("rweasley@ministry.gov.uk".to_string()),
        gender: Gender::Male,
        active: false,
        airport: Some(airports.a50_100.id),
        github: None,
        twitter: None,
        url: Some("http://geocities.com/ron_weas".to_string()),
        slug: "weasley.ron".to_string(),
    })?;

    Ok(People { hermione, harry, ron })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Table::Sites, 2)]
    #[test_case(Table::Airports, 3)]
    #[test_case(Table::Badges, 1)]
    #[test_case(Table::Persons, 3)]
    #[test_case(Table::Awards, 1)]
    fn test_seed_row_counts(table: Table, expected: usize) {
        let db = Database::open_memory().unwrap();
        Fixtures::seed(&db).unwrap();
        assert_eq!(db.count(table).unwrap(), expected);
    }

    #[test]
    fn test_award_links_first_person_and_only_badge() {
        let db = Database::open_memory().unwrap();
        let fx = Fixtures::seed(&db).unwrap();

        assert_eq!(fx.hermione_instructor.person, fx.hermione.id);
        assert_eq!(fx.hermione_instructor.badge, fx.instructor.id);
        assert!(fx.persons().iter().all(|p| p.id >= fx.hermione.id));

        let awards = db.awards_for_person(fx.hermione.id).unwrap();
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].awarded, NaiveDate::from_ymd_opt(2014, 1, 1).unwrap());
        assert!(db.awards_for_person(fx.ron.id).unwrap().is_empty());
    }

    #[test]
    fn test_people_reference_seeded_airports() {
        let db = Database::open_memory().unwrap();
        let fx = Fixtures::seed(&db).unwrap();

        let ron = db.get_person_by_slug("weasley.ron").unwrap().unwrap();
        assert_eq!(ron.airport, Some(fx.airport_50_100.id));
        assert!(!ron.active);

        let ccc = db.get_airport_by_iata("CCC").unwrap().unwrap();
        assert_eq!(ccc.latitude, 50.0);
        assert_eq!(ccc.longitude, 100.0);
    }

    #[test]
    fn test_seeding_twice_aborts_on_first_conflict() {
        let db = Database::open_memory().unwrap();
        Fixtures::seed(&db).unwrap();

        let err = Fixtures::seed(&db).unwrap_err();
        match err {
            Error::AlreadyExists { kind, id } => {
                assert_eq!(kind, "site");
                assert_eq!(id, "alpha.edu");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(db.count(Table::Sites).unwrap(), 2);
    }
}
