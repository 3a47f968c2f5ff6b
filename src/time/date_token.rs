use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use derive_more::Display;
use thiserror::Error;

use crate::time::{format_date, DateRange};

/// A placeholder in the template that stands for one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum DateToken {
    #[display("start_date")]
    Start,
    #[display("tu_date")]
    Tuesday,
    #[display("we_date")]
    Wednesday,
    #[display("th_date")]
    Thursday,
    #[display("end_date")]
    End,
}

impl DateToken {
    pub const ALL: [Self; 5] = [
        Self::Start,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::End,
    ];

    /// The weekday a token is bound to, `None` for the range endpoints.
    #[must_use]
    pub const fn week_day(&self) -> Option<Weekday> {
        match self {
            Self::Tuesday => Some(Weekday::Tue),
            Self::Wednesday => Some(Weekday::Wed),
            Self::Thursday => Some(Weekday::Thu),
            Self::Start | Self::End => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown date placeholder `{0}`")]
pub struct UnknownDateToken(pub String);

impl FromStr for DateToken {
    type Err = UnknownDateToken;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|token| token.to_string() == string.trim())
            .ok_or_else(|| UnknownDateToken(string.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the week {range} has no day for {}", join_tokens(.missing))]
pub struct UnresolvedDates {
    range: DateRange,
    missing: Vec<DateToken>,
}

fn join_tokens(tokens: &[DateToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl UnresolvedDates {
    #[must_use]
    pub fn missing(&self) -> &[DateToken] {
        &self.missing
    }
}

/// Every date token mapped to a concrete calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDates {
    dates: BTreeMap<DateToken, NaiveDate>,
}

impl ResolvedDates {
    #[must_use]
    pub fn get(&self, token: DateToken) -> NaiveDate {
        // resolve_dates refuses to construct a partial mapping
        self.dates[&token]
    }

    #[must_use]
    pub fn formatted(&self, token: DateToken) -> String {
        format_date(self.get(token))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateToken, NaiveDate)> + '_ {
        self.dates.iter().map(|(token, date)| (*token, *date))
    }
}

/// Assigns a calendar day to every [`DateToken`].
///
/// The endpoints of the range fill `start_date` and `end_date` regardless of
/// their weekday, the remaining tokens take the first matching day in the range.
pub fn resolve_dates(range: &DateRange) -> Result<ResolvedDates, UnresolvedDates> {
    let mut dates = BTreeMap::new();
    dates.insert(DateToken::Start, range.start());
    dates.insert(DateToken::End, range.end());

    for token in DateToken::ALL {
        if let Some(date) = token.week_day().and_then(|week_day| range.first(week_day)) {
            dates.insert(token, date);
        }
    }

    let missing = DateToken::ALL
        .into_iter()
        .filter(|token| !dates.contains_key(token))
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(UnresolvedDates {
            range: *range,
            missing,
        });
    }

    Ok(ResolvedDates { dates })
}
