/*
 * The copyright in this software is being made available under the 2-clauses
 * BSD License, included below. This software may be subject to other third
 * party and contributor rights, including patent rights, and no such rights
 * are granted under this license.
 *
 * Copyright (c) 2005, Herve Drolon, FreeImage Team
 * Copyright (c) 2008, 2011-2012, Centre National d'Etudes Spatiales (CNES), FR
 * All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without
 * modification, are permitted provided that the following conditions
 * are met:
 * 1. Redistributions of source code must retain the above copyright
 *    notice, this list of conditions and the following disclaimer.
 * 2. Redistributions in binary form must reproduce the above copyright
 *    notice, this list of conditions and the following disclaimer in the
 *    documentation and/or other materials provided with the distribution.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS `AS IS'
 * AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
 * ARE DISCLAIMED.
 */

//! Safe re-expression of the teacher's `opj_event_mgr`: an info/warning/error
//! callback triple registered at codec-init time (spec §6/§7), instead of
//! the three raw `opj_msg_callback` function pointers + `c_void` user data
//! the teacher carries.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
  Info,
  Warning,
  Error,
}

/// Receives structured diagnostic strings from the codec.
///
/// The default implementation forwards everything to the `log` crate
/// (the teacher's own logging dependency), matching what `opj_event_mgr`
/// does when no explicit handler has been registered: nothing is dropped
/// silently, it just goes wherever the ambient logger sends it.
pub trait EventSink: Send + Sync {
  fn emit(&self, kind: EventKind, msg: &str);
}

/// Forwards to `log::{info,warn,error}!`.
pub struct LogSink;

impl EventSink for LogSink {
  fn emit(&self, kind: EventKind, msg: &str) {
    match kind {
      EventKind::Info => log::info!("{msg}"),
      EventKind::Warning => log::warn!("{msg}"),
      EventKind::Error => log::error!("{msg}"),
    }
  }
}

/// Holds the currently registered sink. One per codec instance; never a
/// process-wide global (spec §9's note against `ExecSingleton`-style
/// globals applies equally to event reporting).
pub struct EventMgr {
  sink: Box<dyn EventSink>,
}

impl Default for EventMgr {
  fn default() -> Self {
    Self {
      sink: Box::new(LogSink),
    }
  }
}

impl EventMgr {
  pub fn with_sink(sink: Box<dyn EventSink>) -> Self {
    Self { sink }
  }

  pub fn info(&self, msg: impl AsRef<str>) {
    self.sink.emit(EventKind::Info, msg.as_ref());
  }

  pub fn warn(&self, msg: impl AsRef<str>) {
    self.sink.emit(EventKind::Warning, msg.as_ref());
  }

  pub fn error(&self, msg: impl AsRef<str>) {
    self.sink.emit(EventKind::Error, msg.as_ref());
  }
}
