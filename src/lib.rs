/*!
# Hoja API

A small HTTP backend that proxies row-oriented CRUD operations onto a
sheet-shaped data source, with a credential-check login endpoint.

## Overview

The server treats each named sheet as a table: the first row is the header
row defining column names, every row below it is one record, and the value
in the identifier column (a header literally named `ID`, or column 0) is
the row key for get/update/delete. Records travel as JSON objects whose
field order follows header order.

## Architecture

- **sheet**: the explicit `{headers, rows}` data model with projections
  between rows and record maps, identifier resolution and next-id
  computation
- **store**: the `RowStore` trait (fetch/append/overwrite/delete by
  1-indexed row position) with an in-memory implementation for tests and a
  JSON-file-backed implementation for the server
- **proxy**: the tabular CRUD operations mapped onto a `RowStore`
- **login**: plaintext-equality credential check against a sheet-backed
  credential table
- **error**: the error taxonomy (400/401/404/500, `{"error": ...}` bodies)
- **config**: environment configuration (`PORT`, `DATA_FILE`,
  `ALLOWED_SHEETS`, `CREDENTIALS_SHEET`)
- **app**: axum routing and handlers

## REST API Endpoints

- `GET /` - health text
- `POST /login` - credential check
- `GET /hoja/:name` - list all records
- `GET /hoja/:name/:id` - get one record
- `POST /hoja/:name` - create a record (body = field map)
- `PUT /hoja/:name/:id` - full overwrite of a record
- `DELETE /hoja/:name/:id` - delete a record

## Known hazards

- Update and delete locate a row by identifier and then write by position
  with no lock spanning the two calls; concurrent structural edits can
  invalidate the position.
- Credentials are compared in plaintext; nothing is hashed.
- A duplicate create produces a duplicate row; nothing deduplicates
  identifiers.
*/

pub mod app;
pub mod config;
pub mod error;
pub mod login;
pub mod proxy;
pub mod sheet;
pub mod store;

pub use config::Config;
pub use error::ApiError;
pub use proxy::TabularProxy;
pub use sheet::{Record, SheetData};
pub use store::{JsonFileStore, MemoryStore, RowStore, StoreError};
