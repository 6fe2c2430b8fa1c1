use serde::Serialize;

/// Number of eras in the narrative.
pub const ERA_COUNT: usize = 17;

/// Index of the final era. Advancing past it ends the timeline.
pub const LAST_ERA: usize = ERA_COUNT - 1;

/// Colour token used by the presentation layer to theme an era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeColor {
    Gray,
    Yellow,
    Blue,
    Emerald,
    Lime,
    Cyan,
    Amber,
    Indigo,
    Rose,
    /// Lighter shade of [`ThemeColor::Orange`].
    LightOrange,
    Orange,
    Green,
    Violet,
    Teal,
    Red,
    Fuchsia,
    Pink,
}

/// One step of the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Era {
    pub index: usize,
    pub engine_label: &'static str,
    pub title: &'static str,
    pub epoch: &'static str,
    pub narrative_text: &'static str,
    pub insight_text: &'static str,
    pub theme_color: ThemeColor,
}

/// Returns the era at `index`, or `None` outside the catalog.
pub fn era(index: usize) -> Option<&'static Era> {
    ERAS.get(index)
}

/// All eras in narrative order.
pub fn eras() -> &'static [Era] {
    &ERAS
}

static ERAS: [Era; ERA_COUNT] = [
    Era {
        index: 0,
        engine_label: "The Null State",
        title: "The Eternal Now",
        epoch: "Pre-Life / 13.8 BYA",
        narrative_text: "In a lifeless universe, the 'Future' is a meaningless concept. Matter interacts only in the immediate present. A rock rolling down a hill does not anticipate the valley. Time is simply a sequence of collisions with zero expectation.",
        insight_text: "Time exists physically, but not conceptually.",
        theme_color: ThemeColor::Gray,
    },
    Era {
        index: 1,
        engine_label: "The Chemical Engine",
        title: "The Circadian Loop",
        epoch: "First Life / 3.5 BYA",
        narrative_text: "The first invention of the future. Cyanobacteria evolve 'Circadian Rhythms', chemical clocks that anticipate the sunrise. Even in the dark, they prepare for the light. This is the first time matter on Earth moves because of something that hasn't happened yet.",
        insight_text: "The Future is a chemical reaction.",
        theme_color: ThemeColor::Yellow,
    },
    Era {
        index: 2,
        engine_label: "The Tidal Engine",
        title: "The Pull of the Moon",
        epoch: "Intertidal Life / ~600 MYA",
        narrative_text: "Life expands its horizon from the Day to the Month. Marine organisms (corals, crabs) develop 'Circalunar Rhythms' to track the tides and moon phases. They anticipate high water for feeding and full moons for spawning weeks in advance.",
        insight_text: "The Future is a rhythm (29 Days).",
        theme_color: ThemeColor::Blue,
    },
    Era {
        index: 3,
        engine_label: "The Biological Engine",
        title: "The Calorie Gamble",
        epoch: "Cambrian Explosion / 541 MYA",
        narrative_text: "Brains evolve to manage movement. A predator predicts where prey will be to avoid wasting calories chasing where it was. The future shifts from a passive chemical clock to a split-second active simulation running inside a nervous system.",
        insight_text: "The Future is a target (Split-Second).",
        theme_color: ThemeColor::Emerald,
    },
    Era {
        index: 4,
        engine_label: "The Ecological Engine",
        title: "The Seasonal Map",
        epoch: "Complex Migration / ~200 MYA",
        narrative_text: "Life expands its horizon from 'seconds' to 'seasons'. Herds develop a collective memory of the past (where the water was last year) to navigate the future. They are not just reacting to the moment, but traversing a mental map of time and space.",
        insight_text: "The Future is a path (1 Year).",
        theme_color: ThemeColor::Lime,
    },
    Era {
        index: 5,
        engine_label: "The Semantic Engine",
        title: "The Grammar of 'If'",
        epoch: "The Cognitive Revolution / 70,000 BCE",
        narrative_text: "Humans invent the 'Subjunctive Mood', grammar that allows us to speak of things that do not exist. We can now plan a hunt for 'tomorrow' or fear a 'spirit' we never see. The future detaches from immediate sensory input and becomes a shared hallucination.",
        insight_text: "The Future is a story.",
        theme_color: ThemeColor::Cyan,
    },
    Era {
        index: 6,
        engine_label: "The Agrarian Engine",
        title: "The Investment of Pain",
        epoch: "Agricultural Revolution / 10,000 BCE",
        narrative_text: "We stop chasing the future (hunting) and start planting it (farming). This is the invention of 'Delayed Gratification.' Humans accept the pain of labor now for a harvest later. The future becomes a contract: Work today, eat tomorrow.",
        insight_text: "The Future is a contract.",
        theme_color: ThemeColor::Amber,
    },
    Era {
        index: 7,
        engine_label: "The Archival Engine",
        title: "The Frozen Past",
        epoch: "Invention of Writing / 3,400 BCE",
        narrative_text: "Writing stabilizes the past. Instead of myths that change every generation, we have records. By seeing a stable Past, we gain the audacity to calculate a stable Future. We begin charting astronomical cycles and tax harvests years in advance.",
        insight_text: "The Future is a schedule.",
        theme_color: ThemeColor::Indigo,
    },
    Era {
        index: 8,
        engine_label: "The Legal Engine",
        title: "The Binding Promise",
        epoch: "Code of Hammurabi / 1750 BCE",
        narrative_text: "Civilization requires more than just predicting the future; it requires binding it. We invent the 'Contract', a tool that forces the future to happen. A promise ('I will pay you next month') becomes enforceable by the state. The future becomes an obligation.",
        insight_text: "The Future is an obligation.",
        theme_color: ThemeColor::Rose,
    },
    Era {
        index: 9,
        engine_label: "The Mythic Engine",
        title: "The Judgment of Time",
        epoch: "Axial Age / 800 BCE",
        narrative_text: "Once we can farm and write, we start imagining the ultimate harvest: the End Times, the Golden Age, the Final Judgment. The future becomes morally loaded. It is no longer just what will happen, but what should happen.",
        insight_text: "The Future is a judgment.",
        theme_color: ThemeColor::LightOrange,
    },
    Era {
        index: 10,
        engine_label: "The Risk Engine",
        title: "The Price of Tomorrow",
        epoch: "Joint-Stock Companies / 1602 AD",
        narrative_text: "With the Dutch East India Company, the future becomes a tradeable asset. We use probability and insurance to price the unknown. You can buy a 'share' of a future outcome without taking the voyage. Risk is distributed. The future becomes liquid capital.",
        insight_text: "The Future is equity.",
        theme_color: ThemeColor::Green,
    },
    Era {
        index: 11,
        engine_label: "The Deterministic Engine",
        title: "The Clockwork Universe",
        epoch: "Scientific Revolution / 1687 AD",
        narrative_text: "Newtonian physics suggests the universe is a predictable machine. If we know the position of every atom, we can calculate the future perfectly. We begin to swap appeasing the future (ritual) for calculating it (science).",
        insight_text: "The Future is a formula.",
        theme_color: ThemeColor::Violet,
    },
    Era {
        index: 12,
        engine_label: "The Industrial Engine",
        title: "The Break in the Circle",
        epoch: "Industrial Revolution / 1760 AD",
        narrative_text: "For thousands of years, life was cyclical. Suddenly, machines break the cycle. We realize our children's lives will be fundamentally different from ours. 'Progress' is invented. The future is no longer a repetition of the past; it is an upward line.",
        insight_text: "The Future is a project.",
        theme_color: ThemeColor::Orange,
    },
    Era {
        index: 13,
        engine_label: "The Synchronization Engine",
        title: "The Standardized Grid",
        epoch: "Railroad Time / 1847 AD",
        narrative_text: "Trains travel faster than the sun. To prevent collisions, we abolish local solar time and invent 'Standard Time' and Time Zones. The future ceases to be a local phenomenon; it becomes a synchronized global grid that everyone must obey.",
        insight_text: "The Future is a coordinated grid.",
        theme_color: ThemeColor::Teal,
    },
    Era {
        index: 14,
        engine_label: "The Strategic Engine",
        title: "The Scenario Planner",
        epoch: "Cold War Futurism / 1950s",
        narrative_text: "The RAND Corporation formalizes 'Future Studies.' Facing nuclear annihilation, we realize the future isn't just 'Progress'; it's a branching tree of probabilities. We use Game Theory and Scenario Planning to navigate the 'unthinkable.'",
        insight_text: "The Future is a branching probability.",
        theme_color: ThemeColor::Red,
    },
    Era {
        index: 15,
        engine_label: "The Computational Engine",
        title: "The Simulated Oracle",
        epoch: "The Digital Age / Today",
        narrative_text: "We no longer just predict; we simulate. We model climate change 100 years out. We live in 'Pre-Traumatic Stress,' worrying about data models of futures that haven't happened. We inhabit the future mentally more than we inhabit the present physically.",
        insight_text: "The Future is a simulation.",
        theme_color: ThemeColor::Fuchsia,
    },
    Era {
        index: 16,
        engine_label: "The Algorithmic Engine",
        title: "The Predictive Feed",
        epoch: "The Algorithmic Era / Now",
        narrative_text: "The loop closes. In the Cambrian Era, biology evolved to predict the world. Now, the world (AI) has evolved to predict us. Algorithms know what we will want before we want it. The future is no longer open; it is curated, nudged, and served to us.",
        insight_text: "The Future is curated.",
        theme_color: ThemeColor::Pink,
    },
];
