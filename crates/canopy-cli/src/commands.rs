// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations. Each writes its user-facing output to `out`.

use std::io::Write;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use canopy_client_identity::{Persistence, VISITOR_ID_KEY};
use canopy_client_locale::LocaleError;
use canopy_common_i18n::{locale_info, t, t_fmt, Direction};

use crate::app::App;

fn persistence_label(persistence: Persistence) -> &'static str {
	match persistence {
		Persistence::Durable => "durable",
		Persistence::Ephemeral => "ephemeral",
	}
}

fn describe_locale(code: &str) -> String {
	match locale_info(code) {
		Some(info) => format!("{} ({code}, {})", info.native_name, info.direction),
		None => code.to_string(),
	}
}

pub fn visitor_id(app: &App, existing: bool, out: &mut impl Write) -> Result<()> {
	let locale = app.locale();

	if existing {
		let id = app
			.identity()
			.get_existing()
			.context("failed to read visitor id")?;
		match id {
			Some(id) => writeln!(out, "{id}")?,
			None => writeln!(out, "{}", t(&locale, "client.visitor.none"))?,
		}
		return Ok(());
	}

	let (id, persistence) = app.identity().get_or_transient();
	writeln!(out, "{id}")?;
	if persistence == Persistence::Ephemeral {
		writeln!(out, "{}", t(&locale, "client.visitor.ephemeral"))?;
	}
	Ok(())
}

pub fn locale_show(app: &App, out: &mut impl Write) -> Result<()> {
	let code = app.policy().resolve_initial();
	let described = describe_locale(&code);
	writeln!(
		out,
		"{}",
		t_fmt(&code, "client.locale.current", &[("locale", described.as_str())])
	)?;
	Ok(())
}

pub fn locale_set(app: &App, code: &str, out: &mut impl Write) -> Result<()> {
	let previous = app.locale();

	match app.notifier().publish(code) {
		Ok(()) => {}
		Err(LocaleError::UnsupportedLocale { code, supported }) => {
			let supported = supported.join(", ");
			bail!(t_fmt(
				&previous,
				"client.locale.unsupported",
				&[("locale", code.as_str()), ("supported", supported.as_str())],
			));
		}
		Err(e) => return Err(e).context("failed to change language"),
	}

	info!(from = %previous, to = %code, "language changed");
	let described = describe_locale(code);
	writeln!(
		out,
		"{}",
		t_fmt(code, "client.locale.changed", &[("locale", described.as_str())])
	)?;

	let document = app.document();
	if let (Some(lang), Some(dir)) = (document.lang(), document.dir()) {
		writeln!(out, "lang=\"{lang}\" dir=\"{dir}\"")?;
	}
	Ok(())
}

pub fn locale_list(app: &App, out: &mut impl Write) -> Result<()> {
	let active = app.locale();
	writeln!(out, "{}", t(&active, "client.locale.available"))?;

	for code in app.policy().supported().codes() {
		let marker = if *code == active { '*' } else { ' ' };
		match locale_info(code) {
			Some(info) => writeln!(out, "{marker} {code}  {} ({})", info.native_name, info.name)?,
			None => writeln!(out, "{marker} {code}")?,
		}
	}
	Ok(())
}

pub fn translate(
	app: &App,
	key: &str,
	args: &[(String, String)],
	out: &mut impl Write,
) -> Result<()> {
	let locale = app.locale();
	let args: Vec<(&str, &str)> = args
		.iter()
		.map(|(name, value)| (name.as_str(), value.as_str()))
		.collect();
	writeln!(out, "{}", t_fmt(&locale, key, &args))?;
	Ok(())
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
	pub visitor_id: String,
	pub persistence: &'static str,
	pub locale: String,
	pub direction: &'static str,
}

/// The startup sequence a client runs: identity first, then the locale.
pub fn session_summary(app: &App) -> SessionSummary {
	let (id, persistence) = app.identity().get_or_transient();
	let locale = app.policy().resolve_initial();
	let direction = locale_info(&locale)
		.map(|info| info.direction)
		.unwrap_or(Direction::Ltr);

	SessionSummary {
		visitor_id: id.into(),
		persistence: persistence_label(persistence),
		locale,
		direction: direction.as_html_dir(),
	}
}

pub fn session(app: &App, json: bool, out: &mut impl Write) -> Result<()> {
	let summary = session_summary(app);

	if json {
		serde_json::to_writer_pretty(&mut *out, &summary).context("failed to encode session")?;
		writeln!(out)?;
		return Ok(());
	}

	let locale = summary.locale.as_str();
	let described = describe_locale(locale);
	writeln!(out, "{}", t(locale, "client.session.title"))?;
	writeln!(
		out,
		"  {}: {} [{}]",
		t(locale, "client.visitor.label"),
		summary.visitor_id,
		summary.persistence
	)?;
	writeln!(
		out,
		"  {}",
		t_fmt(locale, "client.locale.current", &[("locale", described.as_str())])
	)?;
	Ok(())
}

pub fn reset(app: &App, out: &mut impl Write) -> Result<()> {
	let locale = app.locale();
	let store = app.store();

	store
		.remove(VISITOR_ID_KEY)
		.context("failed to clear visitor id")?;
	store
		.remove(app.policy().preference_key())
		.context("failed to clear language preference")?;

	info!("stored identity and preference cleared");
	writeln!(out, "{}", t(&locale, "client.reset.done"))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	use canopy_client_config::layer::{ConfigLayer, LocaleLayer};
	use canopy_client_config::{CanopyConfig, PathsConfig};
	use canopy_client_locale::DEFAULT_PREFERENCE_KEY;
	use canopy_common_storage::{KeyValueStore, MemoryKeyValueStore};

	fn config(ambient: &str) -> CanopyConfig {
		let layer = ConfigLayer {
			locale: Some(LocaleLayer {
				language_override: Some(ambient.to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		CanopyConfig::from_layer(layer, PathsConfig::default()).unwrap()
	}

	fn app(ambient: &str) -> (App, Arc<MemoryKeyValueStore>) {
		let store = Arc::new(MemoryKeyValueStore::new());
		let app = App::with_store(&config(ambient), store.clone()).unwrap();
		(app, store)
	}

	fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
		let mut buf = Vec::new();
		f(&mut buf).unwrap();
		String::from_utf8(buf).unwrap()
	}

	#[test]
	fn test_visitor_id_is_stable() {
		let (app, store) = app("en-US");
		let first = output(|out| visitor_id(&app, false, out));
		let second = output(|out| visitor_id(&app, false, out));

		assert_eq!(first, second);
		assert_eq!(
			store.get(VISITOR_ID_KEY).unwrap().as_deref(),
			Some(first.trim())
		);
		assert_eq!(store.write_count(), 1);
	}

	#[test]
	fn test_visitor_id_existing_does_not_create() {
		let (app, store) = app("en-US");
		let text = output(|out| visitor_id(&app, true, out));

		assert_eq!(text.trim(), "No visitor ID has been created yet");
		assert_eq!(store.write_count(), 0);
	}

	#[test]
	fn test_visitor_id_reports_ephemeral() {
		let (app, store) = app("en-US");
		store.set_available(false);
		let text = output(|out| visitor_id(&app, false, out));

		let mut lines = text.lines();
		assert!(lines.next().is_some());
		assert!(lines.next().unwrap().contains("only valid for the current session"));
	}

	#[test]
	fn test_locale_show_uses_ambient_language() {
		let (app, store) = app("mr-IN");
		let text = output(|out| locale_show(&app, out));

		assert!(text.contains("(mr, ltr)"), "{text}");
		assert_eq!(store.write_count(), 0);
	}

	#[test]
	fn test_locale_set_persists_and_updates_document() {
		let (app, store) = app("en-US");
		let text = output(|out| locale_set(&app, "hi", out));

		assert!(text.contains("lang=\"hi\" dir=\"ltr\""), "{text}");
		assert_eq!(
			store.get(DEFAULT_PREFERENCE_KEY).unwrap().as_deref(),
			Some("hi")
		);
		assert_eq!(app.locale(), "hi");
	}

	#[test]
	fn test_locale_set_rejects_unsupported() {
		let (app, store) = app("en-US");
		let mut buf = Vec::new();
		let err = locale_set(&app, "fr", &mut buf).unwrap_err();

		assert!(err.to_string().contains("'fr' is not supported"), "{err}");
		assert!(buf.is_empty());
		assert_eq!(store.write_count(), 0);
		assert_eq!(app.document().lang(), None);
	}

	#[test]
	fn test_locale_list_marks_active() {
		let (app, _store) = app("hi-IN");
		let text = output(|out| locale_list(&app, out));

		assert!(text.contains("* hi"), "{text}");
		assert!(text.contains("  en"), "{text}");
		assert_eq!(text.lines().count(), 4);
	}

	#[test]
	fn test_translate_in_resolved_locale() {
		let (app, _store) = app("en-GB");
		let args = vec![("locale".to_string(), "Hindi".to_string())];
		let text = output(|out| translate(&app, "client.locale.changed", &args, out));

		assert_eq!(text.trim(), "Language changed to Hindi");
	}

	#[test]
	fn test_session_json() {
		let (app, _store) = app("fr-FR");
		let text = output(|out| session(&app, true, out));

		let value: serde_json::Value = serde_json::from_str(&text).unwrap();
		assert_eq!(value["locale"], "en");
		assert_eq!(value["persistence"], "durable");
		assert_eq!(value["direction"], "ltr");
		assert_eq!(value["visitor_id"].as_str().unwrap().len(), 36);
	}

	#[test]
	fn test_session_after_change_keeps_preference() {
		let (app, store) = app("en-US");
		output(|out| locale_set(&app, "mr", out));

		let restarted = App::with_store(&config("fr-FR"), store.clone()).unwrap();
		assert_eq!(session_summary(&restarted).locale, "mr");
	}

	#[test]
	fn test_reset_clears_both_keys() {
		let (app, store) = app("en-US");
		output(|out| visitor_id(&app, false, out));
		output(|out| locale_set(&app, "hi", out));

		let text = output(|out| reset(&app, out));
		assert_eq!(text.trim(), t("hi", "client.reset.done"));
		assert!(store.get(VISITOR_ID_KEY).unwrap().is_none());
		assert!(store.get(DEFAULT_PREFERENCE_KEY).unwrap().is_none());
	}
}
