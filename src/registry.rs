use bevy::prelude::*;

/// The six navigable sections of the site, one orbiting body each.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SectionId {
    About,
    Skills,
    Projects,
    Contact,
    Experience,
    Services,
}

/// Static description of one navigable body. Defined once at startup and
/// never mutated; sizes and radii are pre-responsive base values that the
/// view layer scales per breakpoint.
#[derive(Clone, Copy, Debug)]
pub struct OrbitBody {
    pub id: SectionId,
    pub size: f32,
    pub orbit_radius: f32,
    /// Base angular rate, scaled by the global motion factor.
    pub orbit_speed: f32,
    /// +1.0 prograde, -1.0 retrograde.
    pub direction: f32,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        SectionId::About,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Contact,
        SectionId::Experience,
        SectionId::Services,
    ];

    pub fn key(&self) -> &'static str {
        match *self {
            SectionId::About => "about",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Contact => "contact",
            SectionId::Experience => "experience",
            SectionId::Services => "services",
        }
    }

    pub fn from_key(key: &str) -> Option<SectionId> {
        SectionId::ALL.iter().copied().find(|s| s.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match *self {
            SectionId::About => "About",
            SectionId::Skills => "Skills",
            SectionId::Projects => "Projects",
            SectionId::Contact => "Contact",
            SectionId::Experience => "Experience",
            SectionId::Services => "Services",
        }
    }

    pub fn color(&self) -> Color {
        match *self {
            SectionId::About => Color::srgb(0.545, 0.271, 0.075), // Mercury brown
            SectionId::Skills => Color::srgb(1.0, 0.843, 0.0),    // Venus gold
            SectionId::Projects => Color::srgb(0.0, 0.808, 0.82), // Earth teal
            SectionId::Contact => Color::srgb(1.0, 0.42, 0.208),  // Mars red
            SectionId::Experience => Color::srgb(1.0, 0.843, 0.0), // Jupiter gold
            SectionId::Services => Color::srgb(1.0, 0.647, 0.0),  // Saturn orange
        }
    }

    pub fn body(&self) -> OrbitBody {
        let (size, orbit_radius, orbit_speed, direction) = match *self {
            SectionId::About => (0.30, 3.0, 0.012, 1.0),
            SectionId::Skills => (0.35, 4.5, 0.010, -1.0),
            SectionId::Projects => (0.40, 6.0, 0.008, 1.0),
            SectionId::Contact => (0.38, 7.5, 0.006, -1.0),
            SectionId::Experience => (0.60, 9.0, 0.004, 1.0),
            SectionId::Services => (0.50, 11.0, 0.003, -1.0),
        };
        OrbitBody {
            id: *self,
            size,
            orbit_radius,
            orbit_speed,
            direction,
        }
    }
}

/// One renderable piece of section copy. The overlay decides typography.
pub enum ContentBlock {
    Heading(&'static str),
    Paragraph(&'static str),
    Bullet(&'static str),
}

pub struct SectionContent {
    pub title: &'static str,
    pub blocks: &'static [ContentBlock],
}

/// Pure lookup from body identity to display content; invoked by the overlay
/// when the navigation machine reports an interior view.
pub fn content(id: SectionId) -> SectionContent {
    use ContentBlock::*;
    match id {
        SectionId::About => SectionContent {
            title: "About",
            blocks: &[
                Heading("About Me"),
                Paragraph(
                    "Passionate web developer with a love for minimalism, detail, \
                     and timeless design.",
                ),
                Heading("My Story"),
                Paragraph(
                    "Hey there — I'm Ayman Uddin Siam, a Full Stack Web Developer from \
                     Bangladesh, currently working at Growthly IT. My journey didn't begin \
                     with a computer science degree — it began with curiosity and late \
                     nights spent learning how the web actually works. I started with HTML \
                     and CSS, fell in love with React, and expanded into building full \
                     applications with the MERN stack, NestJS, and TypeScript. I value \
                     clean design, measurable performance, and user-first thinking.",
                ),
            ],
        },
        SectionId::Skills => SectionContent {
            title: "Technologies",
            blocks: &[
                Heading("Technologies I Use"),
                Paragraph(
                    "React · Next.js · NestJS · TypeScript · Node.js · Express.js · \
                     MongoDB · MySQL · Tailwind CSS · DaisyUI · Framer Motion · Vite · \
                     Git · Docker",
                ),
                Heading("Tooling & Workflow"),
                Paragraph(
                    "VSCode · ESLint · Prettier · GitHub · Netlify · Vercel · Postman · Figma",
                ),
                Heading("Core Competencies"),
                Bullet("Frontend architecture with React / Next.js"),
                Bullet("UI styling with Tailwind CSS and DaisyUI"),
                Bullet("Motion & micro-interactions using Framer Motion"),
                Bullet("Backend APIs with Node.js, Express, NestJS"),
                Bullet("Type-safe code with TypeScript"),
                Bullet("Database design: MongoDB & MySQL"),
                Bullet("Authentication & Authorization (JWT)"),
                Bullet("Performance optimization & accessibility"),
                Bullet("CI/CD, deployment and hosting best practices"),
                Heading("Approach"),
                Paragraph(
                    "I start from clarity: clear requirements, lean designs, and small \
                     iterations. I prefer solutions that last — predictable, testable, \
                     and maintainable.",
                ),
            ],
        },
        SectionId::Projects => SectionContent {
            title: "Featured Projects",
            blocks: &[
                Paragraph("Each project follows: short description · tech · links."),
                Heading("Brainiacs — Team Collaboration Tool"),
                Paragraph(
                    "Full-featured collaboration app with boards, polls, chat, and task \
                     management. Tech: React, Node.js, MongoDB, Framer Motion.",
                ),
                Heading("Lotus — EquiSports (E-commerce)"),
                Paragraph(
                    "Sports equipment marketplace with product CRUD, authentication, and \
                     responsive design. Tech: MERN stack + NestJS for APIs.",
                ),
                Heading("Mahi Bakery — Expense & Profit Tracker"),
                Paragraph(
                    "Daily bakery expense system that calculates ingredient usage and \
                     profit per item. Tech: React frontend, Node backend.",
                ),
                Heading("Healers — Music Streaming (Audio-first)"),
                Paragraph(
                    "Audio-only streaming app with search, playlists, and admin upload.",
                ),
                Heading("ParcelEase — Delivery Management System"),
                Paragraph(
                    "Delivery and order management dashboard with status tracking and \
                     role-based access. Tech: React and NestJS.",
                ),
                Heading("MasterChef — Recipe Sharing"),
                Paragraph(
                    "Community-driven recipe app with user profiles, comments, and \
                     favorites. Emphasis on accessibility and fast browsing.",
                ),
            ],
        },
        SectionId::Contact => SectionContent {
            title: "Contact",
            blocks: &[
                Heading("Get In Touch"),
                Paragraph(
                    "Let's create something extraordinary together. I'd love to hear \
                     about your idea or project.",
                ),
                Bullet("Email: ausiaam83@gmail.com"),
                Bullet("Phone: +8801538288739"),
                Bullet("Location: Mirsarai, Chattogram"),
                Bullet("Follow: Twitter / LinkedIn / GitHub"),
            ],
        },
        SectionId::Experience => SectionContent {
            title: "Experience",
            blocks: &[
                Heading("Full Stack Web Developer — Growthly IT"),
                Paragraph(
                    "Current position. Building scalable web applications with modern \
                     technologies; focus on clean code, efficient architecture, and \
                     exceptional user experiences.",
                ),
                Heading("Full Stack Web Developer — Mahi Bakery"),
                Paragraph(
                    "Developed and maintained a POS system for bakery operations: \
                     inventory management, sales tracking, and daily expense tracking \
                     across frontend and backend.",
                ),
            ],
        },
        SectionId::Services => SectionContent {
            title: "Services & Pricing",
            blocks: &[
                Heading("Services I Offer"),
                Paragraph(
                    "Straightforward, honest scope and pricing. Estimates are starting \
                     points and can be adjusted after requirements.",
                ),
                Bullet("Basic Website — $299 · 1-2 weeks · up to 5 pages, contact form"),
                Bullet("Professional Website — $599 · 2-3 weeks · custom design, SEO basics"),
                Bullet("E-commerce Website — $999 · 3-4 weeks · catalog, checkout, admin"),
                Heading("Additional Services"),
                Bullet("Website Maintenance — $99/month"),
                Bullet("Performance Audit & Optimization — $199"),
                Bullet("SEO Services — $299"),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        for (i, a) in SectionId::ALL.iter().enumerate() {
            for b in SectionId::ALL.iter().skip(i + 1) {
                assert_ne!(a.key(), b.key());
            }
        }
    }

    #[test]
    fn key_round_trips() {
        for id in SectionId::ALL {
            assert_eq!(SectionId::from_key(id.key()), Some(id));
        }
    }

    #[test]
    fn unknown_key_resolves_to_none() {
        assert_eq!(SectionId::from_key("blog"), None);
        assert_eq!(SectionId::from_key(""), None);
    }

    #[test]
    fn every_body_has_content() {
        for id in SectionId::ALL {
            let section = content(id);
            assert!(!section.title.is_empty());
            assert!(!section.blocks.is_empty());
        }
    }

    #[test]
    fn orbits_are_ordered_outward() {
        let mut last = 0.0;
        for id in SectionId::ALL {
            let body = id.body();
            assert!(body.orbit_radius > last);
            last = body.orbit_radius;
            assert!(body.direction == 1.0 || body.direction == -1.0);
            assert!(body.size > 0.0 && body.orbit_speed > 0.0);
        }
    }
}
