//! Filtering and pagination over the in-memory booking collection
//!
//! All state lives in [`ListingState`]; [`reduce`] and [`view`] are pure
//! functions over it, so the engine runs without any terminal attached.

use chrono::NaiveDate;

use crate::models::{Booking, BookingStatus};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Collections larger than this get export options in the UI.
pub const DOWNLOAD_THRESHOLD: usize = 10;

/// Optional criteria; a booking must satisfy every one that is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub booking_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    /// Set the booking id text; blank text clears the criterion.
    pub fn set_booking_id(&mut self, text: &str) {
        let trimmed = text.trim();
        self.booking_id = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
    }

    pub fn is_empty(&self) -> bool {
        self.booking_id.is_none() && self.date.is_none() && self.status.is_none()
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(ref needle) = self.booking_id {
            if !booking.booking_id.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if booking.booking_date != date {
                return false;
            }
        }
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }
        true
    }
}

/// Filter and pagination state for the bookings view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingState {
    pub filter: BookingFilter,
    /// 1-based
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListingState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: BookingFilter::default(),
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
        }
    }

    /// Initial state with page count computed against `bookings`.
    pub fn for_bookings(page_size: usize, bookings: &[Booking]) -> Self {
        refresh(Self::new(page_size), bookings)
    }
}

/// User interactions that change the listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingAction {
    SetBookingId(String),
    SetDate(Option<NaiveDate>),
    SetStatus(Option<BookingStatus>),
    ClearFilters,
    NextPage,
    PrevPage,
    GoToPage(usize),
}

/// One page of filtered bookings.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub items: Vec<&'a Booking>,
    pub current_page: usize,
    pub total_pages: usize,
    pub match_count: usize,
}

/// `ceil(matches / page_size)`, never less than one page.
pub fn page_count(matches: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    matches.div_ceil(page_size).max(1)
}

pub fn filter_bookings<'a>(bookings: &'a [Booking], filter: &BookingFilter) -> Vec<&'a Booking> {
    bookings.iter().filter(|b| filter.matches(b)).collect()
}

/// Apply an action and recompute the page count.
pub fn reduce(state: ListingState, action: ListingAction, bookings: &[Booking]) -> ListingState {
    let mut next = state;
    match action {
        ListingAction::SetBookingId(text) => {
            next.filter.set_booking_id(&text);
            next.current_page = 1;
        }
        ListingAction::SetDate(date) => {
            next.filter.date = date;
            next.current_page = 1;
        }
        ListingAction::SetStatus(status) => {
            next.filter.status = status;
            next.current_page = 1;
        }
        ListingAction::ClearFilters => {
            next.filter = BookingFilter::default();
            next.current_page = 1;
        }
        ListingAction::NextPage => {
            if next.current_page < next.total_pages {
                next.current_page += 1;
            }
        }
        ListingAction::PrevPage => {
            if next.current_page > 1 {
                next.current_page -= 1;
            }
        }
        ListingAction::GoToPage(page) => {
            next.current_page = page.clamp(1, next.total_pages);
        }
    }
    refresh(next, bookings)
}

/// Recompute `total_pages`, falling back to page 1 when the current page
/// no longer exists.
pub fn refresh(state: ListingState, bookings: &[Booking]) -> ListingState {
    let mut next = state;
    let matches = bookings.iter().filter(|b| next.filter.matches(b)).count();
    next.total_pages = page_count(matches, next.page_size);
    if next.current_page > next.total_pages || next.current_page == 0 {
        next.current_page = 1;
    }
    next
}

/// Slice the filtered collection for the current page.
pub fn view<'a>(state: &ListingState, bookings: &'a [Booking]) -> PageView<'a> {
    let filtered = filter_bookings(bookings, &state.filter);
    let match_count = filtered.len();
    let total_pages = page_count(match_count, state.page_size);
    let current_page = if state.current_page == 0 || state.current_page > total_pages {
        1
    } else {
        state.current_page
    };

    let start = (current_page - 1) * state.page_size;
    let items = filtered.into_iter().skip(start).take(state.page_size).collect();

    PageView {
        items,
        current_page,
        total_pages,
        match_count,
    }
}

pub fn show_download_options(bookings: &[Booking]) -> bool {
    bookings.len() > DOWNLOAD_THRESHOLD
}
