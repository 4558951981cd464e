#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use once_cell::sync::Lazy;
use tempfile::TempDir;
use tripflow::{tripflow_config::Config, BookingSession};
use tripflow_core::{BookingGateway, GatewayError};
use tripflow_domain::{
    BookingId, BookingSnapshot, BookingState, GuestRecord, InsuranceStatus, PendingChangeSet,
    RawStatus, VoucherPreview,
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn test_config(base: &Path) -> Config {
    Config {
        progress_dir: Some(base.join("progress")),
        app_origin: "https://shop.example".into(),
        wizard_path: "/booking".into(),
        ..Config::default()
    }
}

/// Builds a session backed by JSON progress files in an isolated directory.
pub fn setup_session(gateway: &Arc<FakeGateway>) -> (BookingSession, Config) {
    let config = test_config(&temp_base());
    let session =
        BookingSession::from_config(gateway.clone(), &config).expect("create booking session");
    (session, config)
}

pub fn guest(id: i64, name: &str, status: InsuranceStatus) -> GuestRecord {
    GuestRecord::new(id, name).with_status(status)
}

#[derive(Default)]
struct Backend {
    bookings: HashMap<BookingId, BookingSnapshot>,
    guests: HashMap<BookingId, Vec<GuestRecord>>,
    preview: Option<VoucherPreview>,
    failing_commits: usize,
    expired: bool,
    commits: Vec<PendingChangeSet>,
    previewed_codes: Vec<Option<String>>,
    status_changes: Vec<(BookingState, Option<String>)>,
}

/// In-memory backend standing in for the booking API.
#[derive(Default)]
pub struct FakeGateway {
    backend: Mutex<Backend>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_booking(&self, booking: BookingSnapshot, guests: Vec<GuestRecord>) {
        let mut backend = self.backend.lock().unwrap();
        backend.guests.insert(booking.booking_id.clone(), guests);
        backend.bookings.insert(booking.booking_id.clone(), booking);
    }

    pub fn update_booking(&self, id: &str, update: impl FnOnce(&mut BookingSnapshot)) {
        let mut backend = self.backend.lock().unwrap();
        let booking = backend
            .bookings
            .get_mut(&BookingId::from(id))
            .expect("known booking");
        update(booking);
    }

    pub fn set_preview(&self, preview: VoucherPreview) {
        self.backend.lock().unwrap().preview = Some(preview);
    }

    pub fn fail_next_commits(&self, times: usize) {
        self.backend.lock().unwrap().failing_commits = times;
    }

    pub fn expire_session(&self) {
        self.backend.lock().unwrap().expired = true;
    }

    pub fn commits(&self) -> Vec<PendingChangeSet> {
        self.backend.lock().unwrap().commits.clone()
    }

    pub fn previewed_codes(&self) -> Vec<Option<String>> {
        self.backend.lock().unwrap().previewed_codes.clone()
    }

    pub fn status_changes(&self) -> Vec<(BookingState, Option<String>)> {
        self.backend.lock().unwrap().status_changes.clone()
    }

    pub fn stored_guests(&self, id: &str) -> Vec<GuestRecord> {
        self.backend
            .lock()
            .unwrap()
            .guests
            .get(&BookingId::from(id))
            .cloned()
            .unwrap_or_default()
    }

    fn with_backend<T>(
        &self,
        op: impl FnOnce(&mut Backend) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut backend = self.backend.lock().unwrap();
        if backend.expired {
            return Err(GatewayError::from_status(401, "token expired"));
        }
        op(&mut backend)
    }
}

fn not_found(id: &BookingId) -> GatewayError {
    GatewayError::from_status(404, format!("booking {} not found", id))
}

impl BookingGateway for FakeGateway {
    fn fetch_booking(&self, booking_id: &BookingId) -> Result<BookingSnapshot, GatewayError> {
        self.with_backend(|backend| {
            backend
                .bookings
                .get(booking_id)
                .cloned()
                .ok_or_else(|| not_found(booking_id))
        })
    }

    fn fetch_guests(&self, booking_id: &BookingId) -> Result<Vec<GuestRecord>, GatewayError> {
        self.with_backend(|backend| Ok(backend.guests.get(booking_id).cloned().unwrap_or_default()))
    }

    fn change_status(
        &self,
        booking_id: &BookingId,
        status: BookingState,
        message: Option<&str>,
    ) -> Result<BookingSnapshot, GatewayError> {
        self.with_backend(|backend| {
            backend
                .status_changes
                .push((status, message.map(str::to_string)));
            let booking = backend
                .bookings
                .get_mut(booking_id)
                .ok_or_else(|| not_found(booking_id))?;
            booking.raw_status = Some(RawStatus::from(status));
            Ok(booking.clone())
        })
    }

    fn commit_insurance(
        &self,
        booking_id: &BookingId,
        changes: &PendingChangeSet,
    ) -> Result<(), GatewayError> {
        self.with_backend(|backend| {
            if backend.failing_commits > 0 {
                backend.failing_commits -= 1;
                return Err(GatewayError::Transport("connection reset".into()));
            }
            let guests = backend.guests.entry(booking_id.clone()).or_default();
            for change in changes {
                if let Some(guest) = guests
                    .iter_mut()
                    .find(|guest| guest.booking_guest_id == change.guest_id)
                {
                    guest.insurance_status = change.to_status;
                }
            }
            backend.commits.push(changes.clone());
            Ok(())
        })
    }

    fn preview_voucher(
        &self,
        _booking_id: &BookingId,
        voucher_code: Option<&str>,
    ) -> Result<VoucherPreview, GatewayError> {
        self.with_backend(|backend| {
            backend.previewed_codes.push(voucher_code.map(str::to_string));
            Ok(backend.preview.clone().unwrap_or_default())
        })
    }

    fn company_confirm_completion(&self, booking_id: &BookingId) -> Result<(), GatewayError> {
        self.with_backend(|backend| {
            let booking = backend
                .bookings
                .get_mut(booking_id)
                .ok_or_else(|| not_found(booking_id))?;
            booking.company_confirmed_completion = true;
            Ok(())
        })
    }

    fn user_confirm_completion(&self, booking_id: &BookingId) -> Result<(), GatewayError> {
        self.with_backend(|backend| {
            let booking = backend
                .bookings
                .get_mut(booking_id)
                .ok_or_else(|| not_found(booking_id))?;
            booking.user_confirmed_completion = true;
            Ok(())
        })
    }

    fn tour_completion_status(&self, booking_id: &BookingId) -> Result<bool, GatewayError> {
        self.with_backend(|backend| {
            let booking = backend
                .bookings
                .get(booking_id)
                .ok_or_else(|| not_found(booking_id))?;
            Ok(booking.company_confirmed_completion && booking.user_confirmed_completion)
        })
    }
}
