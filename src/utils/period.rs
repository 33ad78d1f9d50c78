use chrono::{Datelike, NaiveDate};

/// A calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PayrollPeriod {
    first_day: NaiveDate,
}

impl PayrollPeriod {
    /// `month` is zero-based (0 = January). Returns `None` outside 0..=11.
    pub fn from_month_index(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1).map(|first_day| Self { first_day })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// First day of the following month; exclusive upper bound of this period.
    pub fn end_exclusive(&self) -> NaiveDate {
        let (year, month) = if self.first_day.month() == 12 {
            (self.first_day.year() + 1, 1)
        } else {
            (self.first_day.year(), self.first_day.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        *self < Self::containing(today)
    }
}

/// What a payroll request for a month should do, given how many salary
/// rows already exist for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayrollPlan {
    /// A closed month without data; nothing is fabricated for the past.
    Missing,
    /// Return the stored rows as they are.
    Existing { editable: bool },
    /// Open month with no rows yet: create one per active employee.
    Generate,
}

impl PayrollPlan {
    pub fn decide(period: PayrollPeriod, today: NaiveDate, existing_rows: usize) -> Self {
        let is_past = period.is_past(today);
        match (is_past, existing_rows) {
            (true, 0) => PayrollPlan::Missing,
            (true, _) => PayrollPlan::Existing { editable: false },
            (false, 0) => PayrollPlan::Generate,
            (false, _) => PayrollPlan::Existing { editable: true },
        }
    }
}
