//! Marketing landing page.
//!
//! The page is a fixed content model rendered through an embedded
//! tinytemplate document. Only the brand name and the copyright year vary.

use chrono::{Datelike, Utc};
use serde::Serialize;
use tinytemplate::TinyTemplate;

const LANDING_TEMPLATE: &str = include_str!("landing.html");
const TEMPLATE_NAME: &str = "landing";

pub const DEFAULT_BRAND: &str = "Starfall";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

const CHECK_ICON: &str = "M5 13l4 4L19 7";
const PLUS_ICON: &str = "M12 6v6m0 0v6m0-6h6m-6 0H6";
const IMAGE_ICON: &str = "M4 16l4.586-4.586a2 2 0 012.828 0L16 16m-2-2l1.586-1.586a2 2 0 012.828 0L20 14m-6-6h.01M6 20h12a2 2 0 002-2V6a2 2 0 00-2-2H6a2 2 0 00-2 2v12a2 2 0 002 2z";
const BADGE_ICON: &str = "M9 12l2 2 4-4m6 2a9 9 0 11-18 0 9 9 0 0118 0z";
const TWITTER_ICON: &str = "M8.29 20.251c7.547 0 11.675-6.253 11.675-11.675 0-.178 0-.355-.012-.53A8.348 8.348 0 0022 5.92a8.19 8.19 0 01-2.357.646 4.118 4.118 0 001.804-2.27 8.224 8.224 0 01-2.605.996 4.107 4.107 0 00-6.993 3.743 11.65 11.65 0 01-8.457-4.287 4.106 4.106 0 001.27 5.477A4.072 4.072 0 012.8 9.713v.052a4.105 4.105 0 003.292 4.022 4.095 4.095 0 01-1.853.07 4.108 4.108 0 003.834 2.85A8.233 8.233 0 012 18.407a11.616 11.616 0 006.29 1.84";
const GITHUB_ICON: &str = "M12 2C6.477 2 2 6.484 2 12.017c0 4.425 2.865 8.18 6.839 9.504.5.092.682-.217.682-.483 0-.237-.008-.868-.013-1.703-2.782.605-3.369-1.343-3.369-1.343-.454-1.158-1.11-1.466-1.11-1.466-.908-.62.069-.608.069-.608 1.003.07 1.531 1.032 1.531 1.032.892 1.53 2.341 1.088 2.91.832.092-.647.35-1.088.636-1.338-2.22-.253-4.555-1.113-4.555-4.951 0-1.093.39-1.988 1.029-2.688-.103-.253-.446-1.272.098-2.65 0 0 .84-.27 2.75 1.026A9.564 9.564 0 0112 6.844c.85.004 1.705.115 2.504.337 1.909-1.296 2.747-1.027 2.747-1.027.546 1.379.202 2.398.1 2.651.64.7 1.028 1.595 1.028 2.688 0 3.848-2.339 4.695-4.566 4.943.359.309.678.92.678 1.855 0 1.338-.012 2.419-.012 2.747 0 .268.18.58.688.482A10.019 10.019 0 0022 12.017C22 6.484 17.522 2 12 2z";

#[derive(Debug, thiserror::Error)]
#[error("template error: {0}")]
pub struct PageError(#[from] tinytemplate::error::Error);

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

impl Link {
    const fn new(label: &'static str, href: &'static str) -> Self {
        Link { label, href }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Nav {
    pub login: Link,
    pub signup: Link,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hero {
    pub heading: &'static str,
    pub tagline: &'static str,
    pub cta: Link,
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub src: &'static str,
    pub alt: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Showcase {
    pub image: Image,
    pub heading: &'static str,
    pub body: &'static str,
    pub highlights: Vec<&'static str>,
    pub check_icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub icon_path: &'static str,
    /// Colour family used for the icon badge.
    pub tint: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterColumn {
    pub heading: &'static str,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub label: &'static str,
    pub href: &'static str,
    pub icon_path: &'static str,
    pub evenodd: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LandingPage {
    pub brand: String,
    pub year: i32,
    pub nav: Nav,
    pub hero: Hero,
    pub showcase: Showcase,
    pub features: Vec<Feature>,
    pub footer: Vec<FooterColumn>,
    pub socials: Vec<SocialLink>,
}

impl LandingPage {
    pub fn new(year: i32) -> Self {
        Self::with_brand(DEFAULT_BRAND, year)
    }

    pub fn current() -> Self {
        Self::new(Utc::now().year())
    }

    pub fn with_brand(brand: impl Into<String>, year: i32) -> Self {
        LandingPage {
            brand: brand.into(),
            year,
            nav: Nav {
                login: Link::new("Login", LOGIN_PATH),
                signup: Link::new("Sign Up", SIGNUP_PATH),
            },
            hero: Hero {
                heading: "Make Children's Tasks Fun and Manageable",
                tagline: "Starfall helps parents create engaging weekly task lists for their children, turning everyday chores into exciting adventures.",
                cta: Link::new("Get Started for Free", SIGNUP_PATH),
            },
            showcase: Showcase {
                image: Image {
                    src: "/placeholder.svg",
                    alt: "Sample task list",
                    width: 500,
                    height: 500,
                },
                heading: "Organize Your Child's Week with Ease",
                body: "Create beautiful, printable task lists that your children will love. With Starfall, you can easily manage daily and weekly tasks, track progress, and make responsibility fun!",
                highlights: vec![
                    "Customizable templates for boys and girls",
                    "Easy-to-use task creation system",
                    "Progress tracking with a fun star system",
                ],
                check_icon: CHECK_ICON,
            },
            features: vec![
                Feature {
                    title: "Easy Task Creation",
                    description: "Quickly add and organize daily and weekly tasks for your children.",
                    icon_path: PLUS_ICON,
                    tint: "blue",
                },
                Feature {
                    title: "Beautiful Templates",
                    description: "Choose from a variety of engaging designs that children will love.",
                    icon_path: IMAGE_ICON,
                    tint: "purple",
                },
                Feature {
                    title: "Progress Tracking",
                    description: "Monitor task completion with an engaging star reward system.",
                    icon_path: BADGE_ICON,
                    tint: "green",
                },
            ],
            footer: vec![
                FooterColumn {
                    heading: "About",
                    links: vec![
                        Link::new("About Us", "/about"),
                        Link::new("Contact", "/contact"),
                        Link::new("Blog", "/blog"),
                    ],
                },
                FooterColumn {
                    heading: "Features",
                    links: vec![
                        Link::new("Task Lists", "/features"),
                        Link::new("Templates", "/features/templates"),
                        Link::new("Progress Tracking", "/features/tracking"),
                    ],
                },
                FooterColumn {
                    heading: "Legal",
                    links: vec![
                        Link::new("Privacy Policy", "/privacy"),
                        Link::new("Terms of Service", "/terms"),
                    ],
                },
            ],
            // No destinations yet
            socials: vec![
                SocialLink {
                    label: "Twitter",
                    href: "#",
                    icon_path: TWITTER_ICON,
                    evenodd: false,
                },
                SocialLink {
                    label: "GitHub",
                    href: "#",
                    icon_path: GITHUB_ICON,
                    evenodd: true,
                },
            ],
        }
    }

    /// Every navigation target, in document order.
    pub fn links(&self) -> Vec<&'static str> {
        let mut out = vec![self.nav.login.href, self.nav.signup.href, self.hero.cta.href];
        out.extend(
            self.footer
                .iter()
                .flat_map(|column| column.links.iter().map(|l| l.href)),
        );
        out.extend(self.socials.iter().map(|s| s.href));
        out
    }

    pub fn render(&self) -> Result<String, PageError> {
        let mut tt = TinyTemplate::new();
        tt.add_template(TEMPLATE_NAME, LANDING_TEMPLATE)?;
        Ok(tt.render(TEMPLATE_NAME, self)?)
    }
}
