use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::currency::{convert, RateTable};
use crate::model::Expense;

pub const HEAT_LEVELS: u8 = 4;

/// Converts expenses into the currency totals are displayed in.
#[derive(Clone, Copy)]
pub struct Converter<'a> {
    pub currency: &'a str,
    pub rates: &'a RateTable,
}

impl<'a> Converter<'a> {
    pub fn new(currency: &'a str, rates: &'a RateTable) -> Self {
        Converter { currency, rates }
    }

    pub fn amount_of(&self, expense: &Expense) -> Decimal {
        convert(expense.amount, &expense.currency, self.currency, self.rates)
    }
}

pub fn total<'e>(expenses: impl IntoIterator<Item = &'e Expense>, conv: Converter) -> Decimal {
    expenses
        .into_iter()
        .fold(Decimal::ZERO, |sum, e| sum.saturating_add(conv.amount_of(e)))
}

/// Percentage of `total` taken by `part`, to one decimal place.
pub fn share_percent(part: Decimal, total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|share| share.round_dp(1))
        .unwrap_or(Decimal::ONE_HUNDRED)
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Sum per category, largest first.
pub fn category_totals<'e>(
    expenses: impl IntoIterator<Item = &'e Expense>,
    conv: Converter,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, Decimal> = HashMap::new();
    for expense in expenses {
        let sum = sums.entry(expense.category.as_str()).or_default();
        *sum = sum.saturating_add(conv.amount_of(expense));
    }
    let mut totals = sums
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category: category.to_string(), amount })
        .collect::<Vec<_>>();
    totals.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    totals
}

pub fn daily_totals<'e, Tz: TimeZone>(
    expenses: impl IntoIterator<Item = &'e Expense>,
    conv: Converter,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Decimal> {
    let mut days = BTreeMap::new();
    for expense in expenses {
        let sum = days.entry(expense.local_date(tz)).or_insert(Decimal::ZERO);
        *sum = sum.saturating_add(conv.amount_of(expense));
    }
    days
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn of(date: NaiveDate) -> Self {
        MonthCursor { year: date.year(), month: date.month() }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            MonthCursor { year: self.year - 1, month: 12 }
        } else {
            MonthCursor { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            MonthCursor { year: self.year + 1, month: 1 }
        } else {
            MonthCursor { year: self.year, month: self.month + 1 }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(first), Some(after)) => (after - first).num_days() as u32,
            _ => 0,
        }
    }

    pub fn label(self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub total: Decimal,
    /// 0 for no spending, otherwise 1..=HEAT_LEVELS relative to the busiest day.
    pub level: u8,
}

/// A month of daily spending laid out for a Monday-first heatmap grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarMonth {
    pub cursor: MonthCursor,
    /// Number of empty cells before the first day.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
    pub max: Decimal,
}

impl CalendarMonth {
    pub fn build<'e, Tz: TimeZone>(
        cursor: MonthCursor,
        expenses: impl IntoIterator<Item = &'e Expense>,
        conv: Converter,
        tz: &Tz,
    ) -> Self {
        let Some(first) = cursor.first_day() else {
            return CalendarMonth {
                cursor,
                leading_blanks: 0,
                days: Vec::new(),
                max: Decimal::ZERO,
            };
        };
        let in_month = expenses.into_iter().filter(|e| MonthCursor::of(e.local_date(tz)) == cursor);
        let sums = daily_totals(in_month, conv, tz);
        let max = sums.values().copied().max().unwrap_or(Decimal::ZERO);

        let days = (0..cursor.days_in_month())
            .map(|offset| {
                let date = first + Duration::days(i64::from(offset));
                let total = sums.get(&date).copied().unwrap_or(Decimal::ZERO);
                DayCell { date, total, level: heat_level(total, max) }
            })
            .collect();

        CalendarMonth {
            cursor,
            leading_blanks: first.weekday().num_days_from_monday(),
            days,
            max,
        }
    }
}

pub fn heat_level(total: Decimal, max: Decimal) -> u8 {
    if total <= Decimal::ZERO || max <= Decimal::ZERO {
        return 0;
    }
    let scaled = total
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(HEAT_LEVELS)))
        .map(|level| level.ceil());
    scaled
        .and_then(|level| level.to_u8())
        .unwrap_or(HEAT_LEVELS)
        .clamp(1, HEAT_LEVELS)
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, FixedOffset, Utc};

    use super::*;

    fn expense(id: i64, amount: i64, category: &str, currency: &str, at: &str) -> Expense {
        Expense {
            id,
            user_id: "u1".to_string(),
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: None,
            currency: currency.to_string(),
            created_at: at.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    fn usd() -> RateTable {
        RateTable::identity("USD")
    }

    #[test]
    fn same_currency_total_is_plain_sum() {
        let rates = usd();
        let expenses = vec![
            expense(1, 100, "Food", "USD", "2024-01-01T10:00:00Z"),
            expense(2, 50, "Food", "USD", "2024-01-02T10:00:00Z"),
        ];
        let conv = Converter::new("USD", &rates);
        assert_eq!(format!("{:.2}", total(&expenses, conv)), "150.00");
        let buckets = category_totals(&expenses, conv);
        assert_eq!(buckets, vec![CategoryTotal { category: "Food".into(), amount: 150.into() }]);
    }

    #[test]
    fn categories_partition_the_total() {
        let rates = RateTable::from_response(
            "USD",
            r#"{"success":true,"rates":{"USD":1,"EUR":0.8,"RUB":80}}"#,
        )
        .unwrap();
        let expenses = vec![
            expense(1, 40, "Food", "EUR", "2024-01-01T10:00:00Z"),
            expense(2, 800, "Transport", "RUB", "2024-01-02T10:00:00Z"),
            expense(3, 15, "Food", "USD", "2024-01-03T10:00:00Z"),
            expense(4, 3, "Health", "GBP", "2024-01-03T11:00:00Z"),
        ];
        let conv = Converter::new("USD", &rates);
        let buckets = category_totals(&expenses, conv);
        let sum: Decimal = buckets.iter().map(|b| b.amount).sum();
        assert_eq!(sum, total(&expenses, conv));
        assert_eq!(buckets[0].category, "Food");
        assert_eq!(buckets[0].amount, Decimal::from(65));
        assert_eq!(buckets[1].amount, Decimal::from(10));
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let rates = usd();
        let conv = Converter::new("USD", &rates);
        assert!(category_totals(&[], conv).is_empty());
        assert_eq!(total(&[], conv), Decimal::ZERO);
    }

    #[test]
    fn daily_totals_follow_local_dates() {
        let rates = usd();
        let conv = Converter::new("USD", &rates);
        let expenses = vec![
            expense(1, 10, "Food", "USD", "2024-01-01T22:30:00Z"),
            expense(2, 5, "Food", "USD", "2024-01-02T08:00:00Z"),
        ];
        let utc = daily_totals(&expenses, conv, &Utc);
        assert_eq!(utc.len(), 2);

        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        let shifted = daily_totals(&expenses, conv, &plus_three);
        assert_eq!(shifted.len(), 1);
        assert_eq!(
            shifted[&NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()],
            Decimal::from(15)
        );
    }

    #[test]
    fn month_cursor_wraps_years() {
        let jan = MonthCursor { year: 2024, month: 1 };
        assert_eq!(jan.prev(), MonthCursor { year: 2023, month: 12 });
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(MonthCursor { year: 2024, month: 2 }.days_in_month(), 29);
        assert_eq!(MonthCursor { year: 2023, month: 2 }.days_in_month(), 28);
        assert_eq!(MonthCursor { year: 2023, month: 12 }.days_in_month(), 31);
    }

    #[test]
    fn calendar_month_buckets_and_levels() {
        let rates = usd();
        let conv = Converter::new("USD", &rates);
        let expenses = vec![
            expense(1, 100, "Food", "USD", "2024-05-03T10:00:00Z"),
            expense(2, 20, "Food", "USD", "2024-05-10T10:00:00Z"),
            expense(3, 60, "Food", "USD", "2024-05-10T12:00:00Z"),
            expense(4, 500, "Food", "USD", "2024-06-01T10:00:00Z"),
        ];
        let month = CalendarMonth::build(MonthCursor { year: 2024, month: 5 }, &expenses, conv, &Utc);
        // 2024-05-01 is a Wednesday
        assert_eq!(month.leading_blanks, 2);
        assert_eq!(month.days.len(), 31);
        assert_eq!(month.max, Decimal::from(100));
        assert_eq!(month.days[2].total, Decimal::from(100));
        assert_eq!(month.days[2].level, 4);
        assert_eq!(month.days[9].total, Decimal::from(80));
        assert_eq!(month.days[9].level, 4);
        assert_eq!(month.days[0].level, 0);
        let sum: Decimal = month.days.iter().map(|d| d.total).sum();
        assert_eq!(sum, Decimal::from(180));
    }

    #[test]
    fn heat_levels_scale_with_max() {
        let max = Decimal::from(100);
        assert_eq!(heat_level(Decimal::ZERO, max), 0);
        assert_eq!(heat_level(Decimal::from(1), max), 1);
        assert_eq!(heat_level(Decimal::from(25), max), 1);
        assert_eq!(heat_level(Decimal::from(26), max), 2);
        assert_eq!(heat_level(Decimal::from(75), max), 3);
        assert_eq!(heat_level(max, max), 4);
        assert_eq!(heat_level(Decimal::from(5), Decimal::ZERO), 0);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_overflowing() {
        let rates = usd();
        let conv = Converter::new("USD", &rates);
        let mut expenses = vec![
            expense(1, 0, "Food", "USD", "2024-01-01T10:00:00Z"),
            expense(2, 0, "Food", "USD", "2024-01-01T11:00:00Z"),
        ];
        for e in &mut expenses {
            e.amount = Decimal::new(5, 0) * Decimal::from(10_i64.pow(18)) * Decimal::from(10_i64.pow(10));
        }
        assert_eq!(total(&expenses, conv), Decimal::MAX);
        assert_eq!(category_totals(&expenses, conv)[0].amount, Decimal::MAX);

        let month = CalendarMonth::build(MonthCursor { year: 2024, month: 1 }, &expenses, conv, &Utc);
        assert_eq!(month.max, Decimal::MAX);
        assert_eq!(month.days[0].level, HEAT_LEVELS);
        assert_eq!(heat_level(Decimal::MAX, Decimal::MAX), HEAT_LEVELS);
    }

    #[test]
    fn shares_are_percentages_of_the_total() {
        assert_eq!(share_percent(Decimal::from(1), Decimal::from(3)), Decimal::new(333, 1));
        assert_eq!(share_percent(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(share_percent(Decimal::MAX, Decimal::MAX), Decimal::ONE_HUNDRED);
    }
}
