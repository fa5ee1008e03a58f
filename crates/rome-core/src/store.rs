//! The `RomeStore` trait: keyed persistence with session semantics.
//!
//! Rows are staged with [`RomeStore::insert`] and written by
//! [`RomeStore::commit`]. A commit that would violate a table's primary key
//! fails with an error whose [`StoreError::is_duplicate_key`] is true; the
//! caller then discards the staged rows with [`RomeStore::rollback`].
//!
//! Stored rows are never updated or deleted.

use std::future::Future;

use crate::{kind::ResourceKind, row::PersistedRow};

/// Errors raised by a [`RomeStore`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// True when a commit failed because a row's key already exists.
  fn is_duplicate_key(&self) -> bool;
}

/// Abstraction over a store backend. One caller at a time, hence `&mut self`.
pub trait RomeStore: Send {
  type Error: StoreError;

  /// Create the table for `kind` if it does not exist yet.
  fn ensure_table(
    &mut self,
    kind: ResourceKind,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Stage a row for the next commit.
  fn insert(
    &mut self,
    row: PersistedRow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write every staged row in one transaction.
  ///
  /// On failure nothing is written and the staged rows are kept until
  /// [`rollback`](Self::rollback).
  fn commit(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Discard every staged row.
  fn rollback(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
