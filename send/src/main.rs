use std::io::Read;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use mailshot::{Address, Attachment, Config, Email, Mailgun, ProviderOptions};

const FAILURE: i32 = 1;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "mailshot-send",
    about = "Send a single email through the Mailgun API."
)]
struct Opt {
    /// Config file, defaults to /etc/mailshot/mailshot.toml
    #[structopt(short, long)]
    config: Option<String>,

    /// Sender, either `addr` or `Name <addr>`
    #[structopt(short, long)]
    from: String,

    #[structopt(short, long, required = true)]
    to: Vec<String>,

    #[structopt(long)]
    cc: Vec<String>,

    #[structopt(long)]
    bcc: Vec<String>,

    #[structopt(long)]
    reply_to: Vec<String>,

    #[structopt(short, long, default_value = "")]
    subject: String,

    /// Plaintext body; read from stdin when no body or template is given
    #[structopt(long)]
    text: Option<String>,

    #[structopt(long)]
    html: Option<String>,

    #[structopt(long, parse(from_os_str))]
    attach: Vec<PathBuf>,

    #[structopt(long, parse(from_os_str))]
    inline: Vec<PathBuf>,

    #[structopt(long)]
    tag: Vec<String>,

    /// Name of a stored Mailgun template
    #[structopt(long)]
    template: Option<String>,
}

impl Opt {
    fn needs_stdin(&self) -> bool {
        self.text.is_none() && self.html.is_none() && self.template.is_none()
    }
}

fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn build_email(opt: Opt, stdin_body: Option<String>) -> Email {
    let mut email = Email::new()
        .from(Address::parse(&opt.from))
        .subject(opt.subject);

    for to in &opt.to {
        email = email.to(Address::parse(to));
    }

    for cc in &opt.cc {
        email = email.cc(Address::parse(cc));
    }

    for bcc in &opt.bcc {
        email = email.bcc(Address::parse(bcc));
    }

    for reply_to in &opt.reply_to {
        email = email.reply_to(Address::parse(reply_to));
    }

    email.text_body = opt.text.or(stdin_body);
    email.html_body = opt.html;

    for path in opt.attach {
        let content_type = guess_content_type(&path);
        email = email.attachment(Attachment::from_path(path, content_type));
    }

    for path in opt.inline {
        let content_type = guess_content_type(&path);
        email = email.attachment(Attachment::from_path(path, content_type).inline());
    }

    let mut options = ProviderOptions::default();

    if !opt.tag.is_empty() {
        options.tags = Some(opt.tag);
    }

    options.template_name = opt.template;

    email.provider_options(options)
}

#[tokio::main]
async fn main() {
    // Init logger
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();

    let config = match Config::load(opt.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(FAILURE);
        }
    };

    // Get message body from stdin
    let stdin_body = if opt.needs_stdin() {
        let mut body = String::new();

        if let Err(e) = std::io::stdin().read_to_string(&mut body) {
            log::error!("Failed to read email body from stdin: {}", e);
            std::process::exit(FAILURE);
        }

        Some(body)
    } else {
        None
    };

    let email = build_email(opt, stdin_body);

    let mailgun = match Mailgun::new(config) {
        Ok(mailgun) => mailgun,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(FAILURE);
        }
    };

    match mailgun.deliver(&email).await {
        Ok(result) => println!("{}", result.id),
        Err(e) => {
            log::error!("Could not send email: {}", e);
            std::process::exit(FAILURE);
        }
    }
}
