//! sqlpulse: dashboard client for the SQL Server observability API.
//!
//! The dashboard is modelled headlessly ([`dom`], [`panels`], [`dashboard`])
//! and driven either by the server-rendered web page ([`web`]) or by the
//! command line ([`cli`]). All backend traffic goes through [`http`].

pub mod cli;
pub mod dashboard;
pub mod dom;
pub mod http;
pub mod logging;
pub mod panels;
pub mod settings;
pub mod web;
