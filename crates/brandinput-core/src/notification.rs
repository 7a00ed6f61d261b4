//! Alert email templates.

const GREETING: &str = "Measurement/CPG Brands,";
const SIGN_OFF: &str = "Thanks,\nCore Services";

/// Where the personnel data was supposed to come from, named in the
/// missing-input-data alert so the reader knows what to fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContext {
    Spreadsheet {
        directory: String,
        file_name: Option<String>,
    },
    Database {
        schema: String,
        table: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// Account could not be resolved or no personnel row was found.
    MissingInputData(SourceContext),
    /// Data was found but writing it to the ticket failed part-way.
    PopulationFailed,
    /// Fields were populated (or skipped) but the status transition failed.
    ProgressionFailed,
}

impl Template {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Template::MissingInputData(_) => "missing-input-data",
            Template::PopulationFailed => "population-failed",
            Template::ProgressionFailed => "progression-failed",
        }
    }

    fn lead(&self) -> String {
        match self {
            Template::MissingInputData(SourceContext::Spreadsheet {
                directory,
                file_name,
            }) => format!(
                "There appears to be a problem locating the input data for the Jira ticket, \
                 you may wish to check the spreadsheet: '{}', \
                 located in the '{directory}' directory.",
                file_name.as_deref().unwrap_or("<no workbook found>")
            ),
            Template::MissingInputData(SourceContext::Database { schema, table }) => format!(
                "There appears to be a problem locating the input data for the Jira ticket, \
                 you may wish to check the data table: '{table}', located in the '{schema}' schema."
            ),
            Template::PopulationFailed => "There was a problem populating the ticket fields, \
                 ticket field population should be visually checked."
                .to_string(),
            Template::ProgressionFailed => "There was a problem advancing the ticket status, \
                 ticket field population should be visually checked."
                .to_string(),
        }
    }
}

/// One alert, addressed by the notifier's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub template: Template,
    pub ticket_key: String,
    pub advertiser: String,
}

impl Notification {
    #[must_use]
    pub fn new(template: Template, ticket_key: &str, advertiser: &str) -> Self {
        Self {
            template,
            ticket_key: ticket_key.to_string(),
            advertiser: advertiser.to_string(),
        }
    }

    /// Plain-text body: greeting, template lead, and the ticket/advertiser footer.
    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "{GREETING}\n\n{}\n\nPlease find details below:\n\n\
             Jira Ticket: {}\nAdvertiser: {}\n\n{SIGN_OFF}",
            self.template.lead(),
            self.ticket_key,
            self.advertiser
        )
    }
}
