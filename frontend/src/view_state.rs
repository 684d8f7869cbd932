use std::cmp::Ordering;

use chrono::{NaiveDate, TimeZone};
use rust_decimal::Decimal;

use crate::api::Dashboard;
use crate::config::{DEFAULT_CURRENCY, FALLBACK_CATEGORY};
use crate::currency::RateTable;
use crate::model::{Category, Expense, ExpenseId};
use crate::stats::{self, CalendarMonth, CategoryTotal, Converter, MonthCursor};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    /// Maps the value of the filter `<select>`, where "all" means no filter.
    pub fn from_select(value: &str) -> Self {
        if value.is_empty() || value == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }

    pub fn select_value(&self) -> &str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(name) => name,
        }
    }

    fn matches(&self, expense: &Expense) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => &expense.category == name,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::DateDesc,
        SortOrder::DateAsc,
        SortOrder::AmountDesc,
        SortOrder::AmountAsc,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date-desc",
            SortOrder::DateAsc => "date-asc",
            SortOrder::AmountDesc => "amount-desc",
            SortOrder::AmountAsc => "amount-asc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::DateDesc => "Newest first",
            SortOrder::DateAsc => "Oldest first",
            SortOrder::AmountDesc => "Largest first",
            SortOrder::AmountAsc => "Smallest first",
        }
    }

    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|order| order.key() == key)
            .unwrap_or_default()
    }

    fn compare(self, a: &Expense, b: &Expense, conv: Converter) -> Ordering {
        let by_date_desc = || b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id));
        match self {
            SortOrder::DateDesc => by_date_desc(),
            SortOrder::DateAsc => a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)),
            SortOrder::AmountDesc => conv
                .amount_of(b)
                .cmp(&conv.amount_of(a))
                .then_with(by_date_desc),
            SortOrder::AmountAsc => conv
                .amount_of(a)
                .cmp(&conv.amount_of(b))
                .then_with(by_date_desc),
        }
    }
}

/// A change to the view state, dispatched after the matching remote call
/// succeeded or on a purely local UI event.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewAction {
    Loaded(Dashboard),
    ExpenseAdded(Expense),
    ExpenseDeleted(ExpenseId),
    CategoryAdded(Category),
    CategoryRenamed { from: String, to: String },
    CategoryDeleted { name: String },
    Filter(CategoryFilter),
    Sort(SortOrder),
    SelectDate(NaiveDate),
    ClearDate,
    PrevMonth,
    NextMonth,
    CurrencyChanged { currency: String, rates: RateTable },
}

/// Everything the expense views are derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub expenses: Vec<Expense>,
    pub categories: Vec<Category>,
    pub filter: CategoryFilter,
    pub sort: SortOrder,
    pub selected_date: Option<NaiveDate>,
    pub currency: String,
    pub rates: RateTable,
    pub month: MonthCursor,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        ViewState {
            expenses: Vec::new(),
            categories: Vec::new(),
            filter: CategoryFilter::All,
            sort: SortOrder::default(),
            selected_date: None,
            currency: DEFAULT_CURRENCY.to_string(),
            rates: RateTable::identity(DEFAULT_CURRENCY),
            month: MonthCursor::of(today),
        }
    }

    pub fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::Loaded(dashboard) => {
                self.set_categories(dashboard.categories);
                self.set_currency(dashboard.currency, dashboard.rates);
                self.set_expenses(dashboard.expenses);
            }
            ViewAction::ExpenseAdded(expense) => self.insert_expense(expense),
            ViewAction::ExpenseDeleted(id) => self.remove_expense(id),
            ViewAction::CategoryAdded(category) => {
                let mut categories = std::mem::take(&mut self.categories);
                categories.push(category);
                self.set_categories(categories);
            }
            ViewAction::CategoryRenamed { from, to } => {
                for category in self.categories.iter_mut().filter(|c| c.name == from) {
                    category.name = to.clone();
                }
                self.relabel_expenses(&from, &to);
                let categories = std::mem::take(&mut self.categories);
                self.set_categories(categories);
            }
            ViewAction::CategoryDeleted { name } => {
                self.relabel_expenses(&name, FALLBACK_CATEGORY);
                let categories = std::mem::take(&mut self.categories)
                    .into_iter()
                    .filter(|c| c.name != name)
                    .collect();
                self.set_categories(categories);
            }
            ViewAction::Filter(filter) => self.set_filter(filter),
            ViewAction::Sort(sort) => self.set_sort(sort),
            ViewAction::SelectDate(date) => self.select_date(date),
            ViewAction::ClearDate => self.clear_date(),
            ViewAction::PrevMonth => self.prev_month(),
            ViewAction::NextMonth => self.next_month(),
            ViewAction::CurrencyChanged { currency, rates } => self.set_currency(currency, rates),
        }
    }

    pub fn converter(&self) -> Converter<'_> {
        Converter::new(&self.currency, &self.rates)
    }

    /// Expenses after the category and date filters, in the chosen order.
    pub fn visible<Tz: TimeZone>(&self, tz: &Tz) -> Vec<&Expense> {
        let conv = self.converter();
        let mut list = self
            .expenses
            .iter()
            .filter(|e| self.filter.matches(e))
            .filter(|e| match self.selected_date {
                Some(date) => e.local_date(tz) == date,
                None => true,
            })
            .collect::<Vec<_>>();
        list.sort_by(|a, b| self.sort.compare(a, b, conv));
        list
    }

    pub fn total<Tz: TimeZone>(&self, tz: &Tz) -> Decimal {
        stats::total(self.visible(tz), self.converter())
    }

    pub fn category_totals<Tz: TimeZone>(&self, tz: &Tz) -> Vec<CategoryTotal> {
        stats::category_totals(self.visible(tz), self.converter())
    }

    /// The heatmap ignores the selected date so the whole month stays visible.
    pub fn calendar<Tz: TimeZone>(&self, tz: &Tz) -> CalendarMonth {
        let filtered = self.expenses.iter().filter(|e| self.filter.matches(e));
        CalendarMonth::build(self.month, filtered, self.converter(), tz)
    }

    /// Spending on one local day under the category filter, whichever month
    /// the calendar shows.
    pub fn day_total<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Decimal {
        let filtered = self
            .expenses
            .iter()
            .filter(|e| self.filter.matches(e) && e.local_date(tz) == date);
        stats::total(filtered, self.converter())
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn set_expenses(&mut self, expenses: Vec<Expense>) {
        self.expenses = expenses;
    }

    pub fn insert_expense(&mut self, expense: Expense) {
        self.expenses.retain(|e| e.id != expense.id);
        self.expenses.push(expense);
    }

    pub fn remove_expense(&mut self, id: ExpenseId) {
        self.expenses.retain(|e| e.id != id);
    }

    pub fn set_categories(&mut self, mut categories: Vec<Category>) {
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.categories = categories;
        if let CategoryFilter::Only(name) = &self.filter {
            if !self.categories.iter().any(|c| &c.name == name) {
                self.filter = CategoryFilter::All;
            }
        }
    }

    /// Mirrors a remote category rename (or deletion into the fallback
    /// category) on the loaded expenses and the active filter.
    pub fn relabel_expenses(&mut self, from: &str, to: &str) {
        for expense in self.expenses.iter_mut().filter(|e| e.category == from) {
            expense.category = to.to_string();
        }
        if self.filter == CategoryFilter::Only(from.to_string()) {
            self.filter = CategoryFilter::Only(to.to_string());
        }
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Selecting the already selected date clears the selection.
    pub fn select_date(&mut self, date: NaiveDate) {
        if self.selected_date == Some(date) {
            self.selected_date = None;
        } else {
            self.selected_date = Some(date);
            self.month = MonthCursor::of(date);
        }
    }

    pub fn clear_date(&mut self) {
        self.selected_date = None;
    }

    pub fn set_currency(&mut self, currency: String, rates: RateTable) {
        self.currency = currency;
        self.rates = rates;
    }

    pub fn prev_month(&mut self) {
        self.month = self.month.prev();
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next();
    }
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, Utc};

    use super::*;

    fn expense(id: i64, amount: i64, category: &str, at: &str) -> Expense {
        Expense {
            id,
            user_id: "u1".to_string(),
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: None,
            currency: "USD".to_string(),
            created_at: at.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    fn state() -> ViewState {
        let mut state = ViewState::new(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        state.set_expenses(vec![
            expense(1, 30, "Food", "2024-05-02T10:00:00Z"),
            expense(2, 100, "Transport", "2024-05-01T10:00:00Z"),
            expense(3, 5, "Food", "2024-05-03T10:00:00Z"),
            expense(4, 30, "Health", "2024-05-03T09:00:00Z"),
        ]);
        state
    }

    fn ids(list: &[&Expense]) -> Vec<i64> {
        list.iter().map(|e| e.id).collect()
    }

    #[test]
    fn sorts_by_date_both_ways() {
        let mut state = state();
        assert_eq!(ids(&state.visible(&Utc)), vec![3, 4, 1, 2]);
        state.set_sort(SortOrder::DateAsc);
        assert_eq!(ids(&state.visible(&Utc)), vec![2, 1, 4, 3]);
    }

    #[test]
    fn sorts_by_amount_with_date_tiebreak() {
        let mut state = state();
        state.set_sort(SortOrder::AmountDesc);
        assert_eq!(ids(&state.visible(&Utc)), vec![2, 4, 1, 3]);
        state.set_sort(SortOrder::AmountAsc);
        assert_eq!(ids(&state.visible(&Utc)), vec![3, 4, 1, 2]);
    }

    fn priced(id: i64, amount: i64, currency: &str, category: &str) -> Expense {
        Expense {
            currency: currency.to_string(),
            ..expense(id, amount, category, "2024-05-02T10:00:00Z")
        }
    }

    fn rates(base: &str, body: &str) -> RateTable {
        RateTable::from_response(base, body).unwrap()
    }

    #[test]
    fn amount_sort_compares_converted_amounts() {
        let mut state = ViewState::new(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        state.set_currency(
            "USD".to_string(),
            rates("USD", r#"{"success":true,"rates":{"USD":1,"RUB":100}}"#),
        );
        state.set_expenses(vec![priced(1, 10, "USD", "Food"), priced(2, 500, "RUB", "Food")]);
        state.set_sort(SortOrder::AmountDesc);
        assert_eq!(ids(&state.visible(&Utc)), vec![1, 2]);
        state.set_sort(SortOrder::AmountAsc);
        assert_eq!(ids(&state.visible(&Utc)), vec![2, 1]);
    }

    #[test]
    fn currency_change_swaps_rates_for_every_stat() {
        let mut state = ViewState::new(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        state.set_expenses(vec![priced(1, 10, "USD", "Food"), priced(2, 500, "RUB", "Transport")]);
        assert_eq!(state.total(&Utc), Decimal::from(510));

        state.apply(ViewAction::CurrencyChanged {
            currency: "RUB".to_string(),
            rates: rates("RUB", r#"{"success":true,"rates":{"USD":0.01,"RUB":1}}"#),
        });
        assert_eq!(state.currency, "RUB");
        assert_eq!(state.rates.base, "RUB");
        assert_eq!(state.total(&Utc), Decimal::from(1500));
        assert_eq!(
            state.category_totals(&Utc),
            vec![
                CategoryTotal { category: "Food".to_string(), amount: Decimal::from(1000) },
                CategoryTotal { category: "Transport".to_string(), amount: Decimal::from(500) },
            ]
        );
        state.set_sort(SortOrder::AmountDesc);
        assert_eq!(ids(&state.visible(&Utc)), vec![1, 2]);
    }

    #[test]
    fn sort_keys_round_trip_through_select_values() {
        for order in SortOrder::ALL {
            assert_eq!(SortOrder::from_key(order.key()), order);
        }
        assert_eq!(SortOrder::from_key("bogus"), SortOrder::DateDesc);
    }

    #[test]
    fn filter_limits_list_and_stats() {
        let mut state = state();
        state.set_filter(CategoryFilter::from_select("Food"));
        assert_eq!(ids(&state.visible(&Utc)), vec![3, 1]);
        assert_eq!(state.total(&Utc), Decimal::from(35));
        assert_eq!(state.category_totals(&Utc).len(), 1);

        state.set_filter(CategoryFilter::from_select("all"));
        assert_eq!(state.total(&Utc), Decimal::from(165));
        assert_eq!(state.category_totals(&Utc).len(), 3);
    }

    #[test]
    fn selecting_a_date_twice_clears_it() {
        let mut state = state();
        let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        state.select_date(day);
        assert_eq!(ids(&state.visible(&Utc)), vec![3, 4]);
        state.select_date(day);
        assert_eq!(state.selected_date, None);
        assert_eq!(state.visible(&Utc).len(), 4);
    }

    #[test]
    fn selecting_a_date_moves_calendar() {
        let mut state = state();
        state.select_date(NaiveDate::from_ymd_opt(2023, 12, 24).unwrap());
        assert_eq!(state.month, MonthCursor { year: 2023, month: 12 });
        state.next_month();
        assert_eq!(state.month, MonthCursor { year: 2024, month: 1 });
    }

    #[test]
    fn relabel_follows_rename_and_filter() {
        let mut state = state();
        state.set_filter(CategoryFilter::Only("Food".to_string()));
        state.relabel_expenses("Food", "Groceries");
        assert_eq!(state.filter, CategoryFilter::Only("Groceries".to_string()));
        assert_eq!(state.visible(&Utc).len(), 2);
        assert!(state.expenses.iter().all(|e| e.category != "Food"));
    }

    #[test]
    fn stale_filter_is_dropped_with_its_category() {
        let mut state = state();
        state.set_filter(CategoryFilter::Only("Health".to_string()));
        state.set_categories(vec![Category {
            id: 1,
            user_id: "u1".to_string(),
            name: "Food".to_string(),
        }]);
        assert_eq!(state.filter, CategoryFilter::All);
    }

    #[test]
    fn insert_and_remove() {
        let mut state = state();
        state.insert_expense(expense(9, 1, "Food", "2024-05-20T10:00:00Z"));
        assert_eq!(state.visible(&Utc)[0].id, 9);
        state.remove_expense(9);
        state.remove_expense(42);
        assert_eq!(state.expenses.len(), 4);
    }

    fn categories(names: &[&str]) -> Vec<Category> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Category { id: i as i64, user_id: "u1".to_string(), name: name.to_string() })
            .collect()
    }

    #[test]
    fn loaded_dashboard_replaces_everything() {
        let mut state = ViewState::new(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        state.apply(ViewAction::Loaded(Dashboard {
            categories: categories(&["Other", "Food"]),
            currency: "EUR".to_string(),
            rates: RateTable::identity("EUR"),
            expenses: vec![expense(1, 10, "Food", "2024-05-02T10:00:00Z")],
        }));
        assert_eq!(state.currency, "EUR");
        assert_eq!(state.category_names(), vec!["Food", "Other"]);
        assert_eq!(state.expenses.len(), 1);
    }

    #[test]
    fn deleted_category_moves_expenses_to_fallback() {
        let mut state = state();
        state.set_categories(categories(&["Food", "Health", "Other", "Transport"]));
        state.apply(ViewAction::CategoryDeleted { name: "Food".to_string() });
        assert_eq!(state.category_names(), vec!["Health", "Other", "Transport"]);
        let other = state.expenses.iter().filter(|e| e.category == FALLBACK_CATEGORY).count();
        assert_eq!(other, 2);
    }

    #[test]
    fn added_category_is_sorted_in() {
        let mut state = state();
        state.set_categories(categories(&["Food", "Other"]));
        state.apply(ViewAction::CategoryAdded(Category {
            id: 10,
            user_id: "u1".to_string(),
            name: "Gifts".to_string(),
        }));
        assert_eq!(state.category_names(), vec!["Food", "Gifts", "Other"]);
    }

    #[test]
    fn renamed_category_stays_sorted() {
        let mut state = state();
        state.set_categories(categories(&["Food", "Health", "Other"]));
        state.apply(ViewAction::CategoryRenamed { from: "Food".to_string(), to: "Zoo".to_string() });
        assert_eq!(state.category_names(), vec!["Health", "Other", "Zoo"]);
        assert_eq!(state.expenses.iter().filter(|e| e.category == "Zoo").count(), 2);
    }

    #[test]
    fn selected_day_total_survives_month_navigation() {
        let mut state = state();
        let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        state.select_date(day);
        state.next_month();
        assert_eq!(state.month, MonthCursor { year: 2024, month: 6 });
        assert_eq!(state.day_total(day, &Utc), Decimal::from(35));
        state.set_filter(CategoryFilter::Only("Health".to_string()));
        assert_eq!(state.day_total(day, &Utc), Decimal::from(30));
    }

    #[test]
    fn calendar_ignores_selected_day() {
        let mut state = state();
        state.select_date(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        let month = state.calendar(&Utc);
        let sum: Decimal = month.days.iter().map(|d| d.total).sum();
        assert_eq!(sum, Decimal::from(165));
    }
}
