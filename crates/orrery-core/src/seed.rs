//! Built-in solar-system catalog.
//!
//! Seeds a fresh store with the modules, planet levels, quizzes,
//! achievements and avatars the app ships with.

use orrery_proto::{
    Achievement, AchievementTrigger, CosmeticCategory, CosmeticItem, LearningModule, Level,
    PlanetLevel, Question,
};

use crate::store::{Store, StoreError, records};

/// Module holding the planet tour.
pub const SOLAR_SYSTEM_MODULE: &str = "module_solar_system";

/// Achievement earned by completing every planet level.
pub const SOLAR_SYSTEM_ACHIEVEMENT: &str = "achievement_solar_system";

/// Reward for the sun level, which has no quiz.
const SUN_REWARD: u64 = 100;

/// Reward per correctly answered question.
const QUESTION_REWARD: u64 = 20;

/// A full catalog, ready to be written to a store.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    /// `learning_modules`
    pub modules: Vec<LearningModule>,
    /// `levels`
    pub levels: Vec<Level>,
    /// `planet_levels`
    pub planets: Vec<PlanetLevel>,
    /// `questions`
    pub questions: Vec<Question>,
    /// `achievements`
    pub achievements: Vec<Achievement>,
    /// `avatars`
    pub avatars: Vec<CosmeticItem>,
}

struct PlanetSeed {
    name: &'static str,
    badge: &'static str,
    quiz: &'static [(&'static str, &'static [&'static str], usize)],
}

const PLANETS: &[PlanetSeed] = &[
    PlanetSeed {
        name: "Mercury",
        badge: "Sun Skimmer",
        quiz: &[
            ("Which planet is closest to the Sun?", &["Venus", "Mercury", "Mars"], 1),
            ("How many moons does Mercury have?", &["None", "One", "Two"], 0),
            ("What covers most of Mercury's surface?", &["Oceans", "Craters", "Ice caps"], 1),
        ],
    },
    PlanetSeed {
        name: "Venus",
        badge: "Cloud Diver",
        quiz: &[
            ("Which planet is the hottest?", &["Mercury", "Venus", "Jupiter"], 1),
            ("Venus spins in which direction?", &["Backwards", "Same as Earth"], 0),
            ("Venus clouds are mostly made of?", &["Water", "Sulfuric acid", "Methane"], 1),
        ],
    },
    PlanetSeed {
        name: "Earth",
        badge: "Home Base",
        quiz: &[
            (
                "How long does Earth take to orbit the Sun?",
                &["One day", "One month", "One year"],
                2,
            ),
            ("What fraction of Earth is covered by water?", &["About 30%", "About 70%"], 1),
            ("Earth's only natural satellite is?", &["The Moon", "Phobos", "Europa"], 0),
        ],
    },
    PlanetSeed {
        name: "Mars",
        badge: "Red Rover",
        quiz: &[
            ("Why is Mars red?", &["Iron oxide", "Lava", "Red plants"], 0),
            ("The tallest volcano on Mars is?", &["Mauna Kea", "Olympus Mons", "Etna"], 1),
            ("How many moons does Mars have?", &["Zero", "Two", "Twelve"], 1),
        ],
    },
    PlanetSeed {
        name: "Jupiter",
        badge: "Storm Chaser",
        quiz: &[
            ("Which is the largest planet?", &["Saturn", "Jupiter", "Neptune"], 1),
            ("The Great Red Spot is a?", &["Crater", "Storm", "Mountain"], 1),
            ("Jupiter is mostly made of?", &["Rock", "Hydrogen and helium", "Ice"], 1),
        ],
    },
    PlanetSeed {
        name: "Saturn",
        badge: "Ring Master",
        quiz: &[
            ("Saturn's rings are mostly made of?", &["Ice and rock", "Gas", "Metal"], 0),
            ("Could Saturn float in a giant bathtub?", &["Yes", "No"], 0),
            ("Saturn's largest moon is?", &["Titan", "Io", "Triton"], 0),
        ],
    },
    PlanetSeed {
        name: "Uranus",
        badge: "Sideways Spinner",
        quiz: &[
            ("Uranus rotates on its?", &["Side", "Head", "Normal axis"], 0),
            ("What gives Uranus its color?", &["Methane", "Oxygen", "Iron"], 0),
        ],
    },
    PlanetSeed {
        name: "Neptune",
        badge: "Deep Blue",
        quiz: &[
            ("Which planet is farthest from the Sun?", &["Uranus", "Neptune", "Saturn"], 1),
            ("Neptune has the fastest?", &["Winds", "Rotation", "Orbit"], 0),
            ("Neptune's largest moon is?", &["Triton", "Titan", "Ganymede"], 0),
        ],
    },
];

fn level_id(planet: &str) -> String {
    format!("level_{}", planet.to_lowercase())
}

/// The catalog the app ships with.
pub fn solar_system() -> SeedCatalog {
    let mut catalog = SeedCatalog {
        modules: vec![
            LearningModule {
                id: SOLAR_SYSTEM_MODULE.to_string(),
                title: "The Solar System".to_string(),
                description: "Tour the eight planets from Mercury to Neptune.".to_string(),
                order: 1,
            },
            LearningModule {
                id: "module_stars".to_string(),
                title: "Stars".to_string(),
                description: "How stars are born, live and die.".to_string(),
                order: 2,
            },
            LearningModule {
                id: "module_galaxies".to_string(),
                title: "Galaxies".to_string(),
                description: "Our Milky Way and its neighbours.".to_string(),
                order: 3,
            },
        ],
        ..SeedCatalog::default()
    };

    for (index, planet) in PLANETS.iter().enumerate() {
        let id = level_id(planet.name);
        let ordinal = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let reward: u64 = planet.quiz.iter().map(|_| QUESTION_REWARD).sum();

        catalog.levels.push(Level {
            id: id.clone(),
            module_id: SOLAR_SYSTEM_MODULE.to_string(),
            number: ordinal,
            title: planet.name.to_string(),
            reward,
        });
        catalog.planets.push(PlanetLevel {
            id: id.clone(),
            planet: planet.name.to_string(),
            ordinal,
            reward,
            model_path: format!("models/{}.glb", planet.name.to_lowercase()),
        });
        catalog.achievements.push(Achievement {
            id: format!("achievement_{}", planet.name.to_lowercase()),
            title: planet.badge.to_string(),
            description: format!("Complete the {} level", planet.name),
            trigger: AchievementTrigger::Level(id.clone()),
        });

        for (number, (prompt, options, correct)) in planet.quiz.iter().enumerate() {
            let number = u32::try_from(number + 1).unwrap_or(u32::MAX);
            catalog.questions.push(Question {
                id: format!("q_{}_{number}", planet.name.to_lowercase()),
                level_id: id.clone(),
                number,
                prompt: (*prompt).to_string(),
                options: options.iter().map(|o| (*o).to_string()).collect(),
                correct_option: *correct,
                reward: QUESTION_REWARD,
            });
        }
    }

    catalog.levels.push(Level {
        id: "level_sun".to_string(),
        module_id: "module_stars".to_string(),
        number: 1,
        title: "Our Sun".to_string(),
        reward: SUN_REWARD,
    });

    catalog.achievements.push(Achievement {
        id: SOLAR_SYSTEM_ACHIEVEMENT.to_string(),
        title: "Grand Tour".to_string(),
        description: "Complete every planet level".to_string(),
        trigger: AchievementTrigger::AllLevels,
    });

    catalog.avatars = vec![
        cosmetic("avatar_default", "Cadet", 0, CosmeticCategory::Avatar),
        cosmetic("frame_orbit", "Orbit Frame", 200, CosmeticCategory::Frame),
        cosmetic("avatar_comet", "Comet", 300, CosmeticCategory::Avatar),
        cosmetic("background_nebula", "Nebula", 400, CosmeticCategory::Background),
        cosmetic("avatar_astronaut", "Astronaut", 500, CosmeticCategory::Avatar),
        cosmetic("avatar_alien", "Friendly Alien", 750, CosmeticCategory::Avatar),
    ];

    catalog
}

fn cosmetic(id: &str, name: &str, price: u64, category: CosmeticCategory) -> CosmeticItem {
    CosmeticItem {
        id: id.to_string(),
        name: name.to_string(),
        price,
        category,
        image_path: format!("avatars/{id}.png"),
    }
}

/// Write every catalog record to the store.
pub async fn seed_catalog<S: Store + ?Sized>(
    store: &S,
    catalog: &SeedCatalog,
) -> Result<usize, StoreError> {
    let mut written = 0;

    for module in &catalog.modules {
        records::save(store, module).await?;
        written += 1;
    }
    for level in &catalog.levels {
        records::save(store, level).await?;
        written += 1;
    }
    for planet in &catalog.planets {
        records::save(store, planet).await?;
        written += 1;
    }
    for question in &catalog.questions {
        records::save(store, question).await?;
        written += 1;
    }
    for achievement in &catalog.achievements {
        records::save(store, achievement).await?;
        written += 1;
    }
    for item in &catalog.avatars {
        records::save(store, item).await?;
        written += 1;
    }

    tracing::info!("Seeded {} catalog documents", written);
    Ok(written)
}
