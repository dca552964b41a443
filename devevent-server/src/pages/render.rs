//! Server-side HTML
//!
//! Plain string building. Every interpolated value goes through [`escape`].

use devevent_core::Event;

/// HTML-escape text for element content and quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// State of the booking card on the detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingWidget {
    Form {
        email: String,
        error: Option<String>,
    },
    Booked,
}

impl Default for BookingWidget {
    fn default() -> Self {
        Self::Form {
            email: String::new(),
            error: None,
        }
    }
}

/// Everything the detail page shows
#[derive(Debug, Clone)]
pub struct DetailView {
    pub event: Event,
    pub bookings: i64,
    pub similar: Vec<Event>,
    pub widget: BookingWidget,
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | DevEvent</title>\n\
         </head>\n\
         <body>\n\
         <nav><a href=\"/\">DevEvent</a></nav>\n\
         <main>\n{}</main>\n\
         </body>\n\
         </html>\n",
        escape(title),
        body
    )
}

fn event_card(event: &Event) -> String {
    format!(
        "<a class=\"event-card\" href=\"/events/{slug}\">\n\
         <img class=\"poster\" src=\"{image}\" alt=\"{title}\">\n\
         <p class=\"location\">{location}</p>\n\
         <p class=\"title\">{title}</p>\n\
         <p class=\"datetime\">{date} {time}</p>\n\
         </a>\n",
        slug = escape(&event.slug),
        image = escape(&event.image),
        title = escape(&event.title),
        location = escape(&event.location),
        date = escape(&event.date),
        time = escape(&event.time),
    )
}

fn event_list(events: &[Event]) -> String {
    let cards: String = events.iter().map(event_card).collect();
    format!("<ul class=\"events\">\n{cards}</ul>\n")
}

/// `GET /` - featured events
pub fn listing_page(events: &[Event]) -> String {
    let mut body = String::from(
        "<section id=\"home\">\n\
         <h1>The Hub for Every Dev Event You Can't Miss</h1>\n\
         <p>Hackathons, Meetups, and Conferences, All in One Place</p>\n\
         <h3>Featured Events</h3>\n",
    );
    if events.is_empty() {
        body.push_str("<p class=\"empty\">No events yet.</p>\n");
    } else {
        body.push_str(&event_list(events));
    }
    body.push_str("</section>\n");

    layout("Home", &body)
}

fn detail_item(label: &str, value: &str) -> String {
    format!(
        "<div class=\"detail-item\"><span>{}</span><p>{}</p></div>\n",
        label,
        escape(value)
    )
}

fn agenda(items: &[String]) -> String {
    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>\n", escape(item)))
        .collect();
    format!("<div class=\"agenda\">\n<h2>Agenda</h2>\n<ul>\n{items}</ul>\n</div>\n")
}

fn tags(tags: &[String]) -> String {
    let pills: String = tags
        .iter()
        .map(|tag| format!("<div class=\"pill\">{}</div>\n", escape(tag)))
        .collect();
    format!("<div class=\"tags\">\n{pills}</div>\n")
}

/// Booking count line shown above the form
pub fn booking_count_text(bookings: i64) -> String {
    if bookings > 0 {
        format!("Join {bookings} people who have already booked their spot!")
    } else {
        "Be the first to book your spot!".to_string()
    }
}

fn booking_widget(slug: &str, widget: &BookingWidget) -> String {
    match widget {
        BookingWidget::Booked => {
            "<div id=\"book-event\">\n<p class=\"text-sm\">Success! You've booked your spot.</p>\n</div>\n"
                .to_string()
        }
        BookingWidget::Form { email, error } => {
            let error = error
                .as_deref()
                .map(|e| format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(e)))
                .unwrap_or_default();
            format!(
                "<div id=\"book-event\">\n\
                 <form method=\"post\" action=\"/events/{slug}/book\">\n\
                 <div>\n\
                 <label for=\"email\">Email Address</label>\n\
                 <input type=\"email\" id=\"email\" name=\"email\" value=\"{email}\" required \
                 placeholder=\"Enter your email address\">\n\
                 </div>\n\
                 {error}\
                 <button type=\"submit\" class=\"button-submit\">Submit</button>\n\
                 </form>\n\
                 </div>\n",
                slug = escape(slug),
                email = escape(email),
            )
        }
    }
}

/// `GET /events/{slug}`
pub fn detail_page(view: &DetailView) -> String {
    let event = &view.event;
    let mut body = String::new();

    body.push_str(&format!(
        "<section id=\"event\">\n\
         <div class=\"header\">\n<h1>Event Description</h1>\n<p>{}</p>\n</div>\n",
        escape(&event.description)
    ));

    body.push_str("<div class=\"details\">\n<div class=\"content\">\n");
    body.push_str(&format!(
        "<img class=\"banner\" src=\"{}\" alt=\"Event Banner\">\n",
        escape(&event.image)
    ));
    body.push_str(&format!(
        "<section>\n<h2>Overview</h2>\n<p>{}</p>\n</section>\n",
        escape(&event.overview)
    ));

    body.push_str("<section>\n<h2>Event Details</h2>\n");
    body.push_str(&detail_item("Date", &event.date));
    body.push_str(&detail_item("Time", &event.time));
    body.push_str(&detail_item("Location", &event.location));
    body.push_str(&detail_item("Mode", event.mode.as_str()));
    body.push_str(&detail_item("Audience", &event.audience));
    body.push_str("</section>\n");

    body.push_str(&agenda(&event.agenda));
    body.push_str(&format!(
        "<section>\n<h2>About the Organizer</h2>\n<p>{}</p>\n</section>\n",
        escape(&event.organizer)
    ));
    body.push_str(&tags(&event.tags));
    body.push_str("</div>\n");

    body.push_str(&format!(
        "<aside class=\"booking\">\n<div class=\"signup-card\">\n\
         <h2>Book Your Spot</h2>\n<p class=\"text-sm\">{}</p>\n{}</div>\n</aside>\n",
        booking_count_text(view.bookings),
        booking_widget(&event.slug, &view.widget)
    ));
    body.push_str("</div>\n");

    body.push_str("<div class=\"similar\">\n<h2>Similar Events</h2>\n");
    if !view.similar.is_empty() {
        body.push_str(&event_list(&view.similar));
    }
    body.push_str("</div>\n</section>\n");

    layout(&event.title, &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not Found",
        "<section id=\"not-found\">\n<h1>404</h1>\n<p>This page could not be found.</p>\n\
         <a href=\"/\">Back to events</a>\n</section>\n",
    )
}

pub fn error_page(message: &str) -> String {
    layout(
        "Something went wrong",
        &format!(
            "<section id=\"error\">\n<h1>Something went wrong</h1>\n<p>{}</p>\n\
             <a href=\"/\">Back to events</a>\n</section>\n",
            escape(message)
        ),
    )
}
