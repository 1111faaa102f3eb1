//! Input checks applied before a request is built.
//!
//! Every function is pure: it either accepts the value or returns the
//! [`ValidationError`] describing the expected format. Nothing here touches
//! the network, so a rejected input never consumes a retry attempt.

use std::sync::LazyLock;

use regex::Regex;

use crate::ValidationError;

type Result = std::result::Result<(), ValidationError>;

// Patterns run with Unicode classes off: `\d`, `\s` and case folding are ASCII only.
static POSTCODE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // full, e.g. SW1A 1AA
        Regex::new(r"(?i-u)^[a-z]{1,2}\d[a-z\d]?\s?\d[a-z]{2}$")
            .expect("static regex must compile"),
        // district, e.g. SW1A
        Regex::new(r"(?i-u)^[a-z]{1,2}\d[a-z\d]?$").expect("static regex must compile"),
        // sector, e.g. SW1A 1
        Regex::new(r"(?i-u)^[a-z]{1,2}\d[a-z\d]?\s?\d$").expect("static regex must compile"),
    ]
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^(-?\d+(?:\.\d+)?),\s?(-?\d+(?:\.\d+)?)$")
        .expect("static regex must compile")
});

static THREE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)^[a-z]+\.[a-z]+\.[a-z]+$").expect("static regex must compile")
});

static TOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^[a-zA-Z\s\-']+$").expect("static regex must compile"));

static UPRN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^\d{1,12}$").expect("static regex must compile"));

static TITLE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)^[a-z]{1,3}\d{1,8}$").expect("static regex must compile"));

const MAX_TOWN_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 500;
const MAX_PER_PAGE: u32 = 100;

/// Accepts a full UK postcode, a postcode district or a postcode sector.
pub fn postcode(value: &str) -> Result {
    if POSTCODE_PATTERNS.iter().any(|pattern| pattern.is_match(value)) {
        Ok(())
    } else {
        Err(ValidationError::Postcode)
    }
}

/// Accepts `lat,lng` with an optional space after the comma.
pub fn location(value: &str) -> Result {
    let captures = LOCATION.captures(value).ok_or(ValidationError::Location)?;
    let lat: f64 = captures[1].parse().map_err(|_| ValidationError::Location)?;
    let lng: f64 = captures[2].parse().map_err(|_| ValidationError::Location)?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::Latitude);
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ValidationError::Longitude);
    }
    Ok(())
}

/// Accepts a what3words address: three letter-only words joined by periods.
pub fn three_word_address(value: &str) -> Result {
    if THREE_WORDS.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::ThreeWordAddress)
    }
}

pub fn town(value: &str) -> Result {
    if value.chars().count() > MAX_TOWN_LEN {
        return Err(ValidationError::TownTooLong);
    }
    if !TOWN.is_match(value) {
        return Err(ValidationError::TownCharacters);
    }
    Ok(())
}

/// Fails unless at least one of the candidate location values is non-empty.
pub fn location_required<'a, I>(candidates: I) -> Result
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    if candidates
        .into_iter()
        .any(|value| value.is_some_and(|value| !value.is_empty()))
    {
        Ok(())
    } else {
        Err(ValidationError::LocationRequired)
    }
}

pub fn pagination(page: u32, per_page: u32) -> Result {
    if page < 1 {
        return Err(ValidationError::Page);
    }
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ValidationError::PerPage);
    }
    Ok(())
}

/// Accepts a free-text address of at most 500 characters that is not blank.
pub fn address(value: &str) -> Result {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyAddress);
    }
    if value.chars().count() > MAX_ADDRESS_LEN {
        return Err(ValidationError::AddressTooLong);
    }
    Ok(())
}

/// Unique Property Reference Number: 1 to 12 digits.
pub fn uprn(value: &str) -> Result {
    if UPRN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Uprn)
    }
}

/// Land Registry title number: 1-3 letters then 1-8 digits.
pub fn title_number(value: &str) -> Result {
    if TITLE_NUMBER.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::TitleNumber)
    }
}

pub fn positive(value: f64, field: &str) -> Result {
    // NaN fails both comparisons, so test for the accepted range.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive {
            field: field.to_owned(),
        })
    }
}

pub fn non_negative(value: f64, field: &str) -> Result {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Negative {
            field: field.to_owned(),
        })
    }
}

/// Planning application age in days.
pub fn max_age(days: i64) -> Result {
    if (14..=1500).contains(&days) {
        Ok(())
    } else {
        Err(ValidationError::MaxAge)
    }
}

pub fn storeys(storeys: i64) -> Result {
    if (1..=4).contains(&storeys) {
        Ok(())
    } else {
        Err(ValidationError::Storeys)
    }
}

/// Internal floor area in square feet; no upper bound.
pub fn internal_area(square_feet: f64) -> Result {
    if square_feet >= 300.0 {
        Ok(())
    } else {
        Err(ValidationError::InternalArea)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_accepts_full_district_and_sector() {
        for value in ["SW1A 1AA", "sw1a1aa", "M1 1AE", "SW1A", "M1", "SW1A 1", "B33 8"] {
            assert_eq!(postcode(value), Ok(()), "{value} should be accepted");
        }
    }

    #[test]
    fn postcode_rejects_garbage() {
        for value in ["", "12345", "SW1A 1AAA", "ABC1 1AA", "SW1A  1AA"] {
            assert_eq!(postcode(value), Err(ValidationError::Postcode), "{value}");
        }
    }

    #[test]
    fn location_checks_shape_and_ranges() {
        assert_eq!(location("51.501,-0.141"), Ok(()));
        assert_eq!(location("51.501, -0.141"), Ok(()));
        assert_eq!(location("-90,180"), Ok(()));
        assert_eq!(location("51.501"), Err(ValidationError::Location));
        assert_eq!(location("51.501,  -0.141"), Err(ValidationError::Location));
        assert_eq!(location("abc,def"), Err(ValidationError::Location));
        assert_eq!(location("90.5,0"), Err(ValidationError::Latitude));
        assert_eq!(location("0,-180.01"), Err(ValidationError::Longitude));
    }

    #[test]
    fn three_word_address_is_case_insensitive() {
        assert_eq!(three_word_address("pretty.needed.chill"), Ok(()));
        assert_eq!(three_word_address("Pretty.Needed.Chill"), Ok(()));
        assert_eq!(
            three_word_address("pretty.needed"),
            Err(ValidationError::ThreeWordAddress)
        );
        assert_eq!(
            three_word_address("pretty.need3d.chill"),
            Err(ValidationError::ThreeWordAddress)
        );
    }

    #[test]
    fn town_limits_length_and_characters() {
        assert_eq!(town("Stoke-on-Trent"), Ok(()));
        assert_eq!(town("King's Lynn"), Ok(()));
        assert_eq!(town(&"a".repeat(101)), Err(ValidationError::TownTooLong));
        assert_eq!(town("London2"), Err(ValidationError::TownCharacters));
    }

    #[test]
    fn location_required_needs_one_non_empty_value() {
        assert_eq!(location_required([None, Some(""), None, Some("Leeds")]), Ok(()));
        assert_eq!(
            location_required([None, Some(""), None, None]),
            Err(ValidationError::LocationRequired)
        );
    }

    #[test]
    fn pagination_bounds() {
        assert_eq!(pagination(1, 1), Ok(()));
        assert_eq!(pagination(3, 100), Ok(()));
        assert_eq!(pagination(0, 20), Err(ValidationError::Page));
        assert_eq!(pagination(1, 0), Err(ValidationError::PerPage));
        assert_eq!(pagination(1, 101), Err(ValidationError::PerPage));
    }

    #[test]
    fn address_rules() {
        assert_eq!(address("10 Downing Street"), Ok(()));
        assert_eq!(address("   "), Err(ValidationError::EmptyAddress));
        assert_eq!(address(&"x".repeat(501)), Err(ValidationError::AddressTooLong));
    }

    #[test]
    fn identifiers() {
        assert_eq!(uprn("100023336956"), Ok(()));
        assert_eq!(uprn("1000233369561"), Err(ValidationError::Uprn));
        assert_eq!(uprn("12a"), Err(ValidationError::Uprn));
        assert_eq!(title_number("DN123456"), Ok(()));
        assert_eq!(title_number("dn1"), Ok(()));
        assert_eq!(title_number("ABCD1"), Err(ValidationError::TitleNumber));
        assert_eq!(title_number("DN123456789"), Err(ValidationError::TitleNumber));
    }

    #[test]
    fn patterns_reject_non_ascii_digits_spaces_and_letters() {
        assert_eq!(uprn("\u{0661}\u{0662}\u{0663}"), Err(ValidationError::Uprn));
        assert_eq!(postcode("SW1A \u{0661}AA"), Err(ValidationError::Postcode));
        assert_eq!(postcode("SW1A\u{2003}1AA"), Err(ValidationError::Postcode));
        assert_eq!(title_number("DN\u{FF11}"), Err(ValidationError::TitleNumber));
        assert_eq!(title_number("\u{212A}N1"), Err(ValidationError::TitleNumber));
        assert_eq!(town("Leeds\u{00A0}City"), Err(ValidationError::TownCharacters));
        assert_eq!(town("Z\u{00FC}rich"), Err(ValidationError::TownCharacters));
        assert_eq!(
            three_word_address("\u{017F}ome.words.here"),
            Err(ValidationError::ThreeWordAddress)
        );
        assert_eq!(location("\u{0665}1,0"), Err(ValidationError::Location));
        assert_eq!(location("51,\u{00A0}0"), Err(ValidationError::Location));
    }

    #[test]
    fn numeric_ranges() {
        assert_eq!(positive(0.5, "price"), Ok(()));
        assert_eq!(
            positive(0.0, "price"),
            Err(ValidationError::NotPositive {
                field: "price".to_owned()
            })
        );
        assert!(positive(f64::NAN, "price").is_err());
        assert_eq!(non_negative(0.0, "deposit"), Ok(()));
        assert!(non_negative(-1.0, "deposit").is_err());
        assert_eq!(max_age(14), Ok(()));
        assert_eq!(max_age(1500), Ok(()));
        assert_eq!(max_age(13), Err(ValidationError::MaxAge));
        assert_eq!(storeys(4), Ok(()));
        assert_eq!(storeys(5), Err(ValidationError::Storeys));
        assert_eq!(internal_area(300.0), Ok(()));
        assert_eq!(internal_area(299.9), Err(ValidationError::InternalArea));
    }
}
