//! Error alerts shown to the user when a form submission or API request fails.
//!
//! Alerts are HTML fragments swapped into the `#alert-container` element by
//! the HTMX response-targets extension.

use maud::{Markup, Render, html};

/// An error message with optional details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self { message, details }
    }
}

impl Render for Alert<'_> {
    fn render(&self) -> Markup {
        html! {
            div
                class="p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50
                    dark:bg-gray-800 dark:text-red-400"
                role="alert"
            {
                div class="flex justify-between items-start gap-4"
                {
                    div
                    {
                        p class="font-medium" { (self.message) }

                        @if !self.details.is_empty() {
                            span class="block mt-1" { (self.details) }
                        }
                    }

                    button
                        type="button"
                        class="font-bold"
                        aria-label="Dismiss"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}
