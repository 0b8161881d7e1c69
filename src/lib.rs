/*!
# Event Check-in Dashboard

A single-page check-in form for event attendees, backed by a shared response
store, with aggregate charts for everyone who has checked in and a small set
of staff tools.

## Overview

Attendees fill in a short form (name, age, faith questions, where they come
from). After submitting they see live charts over every response collected
so far. Staff additionally get a raw data table, a CSV download and a
clear-all button.

## Architecture

### Page Layer (feature `web`)
- **Technologies**: axum, tower-http, plotters
- **Key Components**:
  - Router - One handler per route, each turning a request into one event
  - Views - Server-rendered HTML for the form, results and staff panel
  - Graphs - Pie, bar and tile-map charts drawn to inline SVG

### Core
- **Dashboard** - Pure reducer over page state plus an effect runner
- **Admin Gate** - Identity allow-list or shared staff code, and single-use
  clear tokens
- **Charts** - Aggregation of the stored responses into chart specs
- **Binning** - Age to age-range mapping

### Data Persistence Layer
- CSV file (default), SQLite (feature `sqlite`) or in-memory store behind the
  `ResponseStore` trait
- CSV export with the stored column order

## Modules

- **admin**: Admin visibility, policies and the clear guard
- **binning**: Age ranges
- **chart**: Chart kinds and aggregation
- **config**: Environment configuration
- **dashboard**: Events, reducer and effect dispatch
- **downloader**: CSV export
- **loader**: CSV import
- **regions**: Country and state lists
- **response**: Stored rows, form input and validation
- **session**: Submission flag and identity sessions
- **store**: Response store backends
- **app**, **views**, **graph**: HTTP server and rendering (feature `web`)

## Routes

- `GET /` - Form or results, `?chart=` and `?page=` pick the view
- `POST /submit` - Check in
- `POST /admin/clear` - Delete every response
- `POST /admin/unlock` - Enter the staff code
- `GET /admin/download` - CSV export
- `GET /api/chart` - Chart aggregation as JSON
- `GET /login`, `GET /logout` - Identity provider hand-off
*/

pub mod admin;
pub mod binning;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod downloader;
pub mod loader;
pub mod regions;
pub mod response;
pub mod session;
pub mod store;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;
#[cfg(feature = "web")]
pub mod views;

pub use admin::{AdminPolicy, ClearGuard, Identity, Viewer, is_admin};
pub use binning::{AgeRange, bin_age};
pub use chart::{ChartKind, ChartSpec, render_chart};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardState, Event, reduce};
pub use response::{Answer, Response, ResponseForm};
pub use store::{ResponseStore, StoreError};
