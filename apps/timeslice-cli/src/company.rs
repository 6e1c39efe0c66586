use std::rc::Rc;

use timeslice_kernel::{Clock, TemporalResult, TemporalStore, Timeline, Timestamp};

/// Sample host type with three tracked attributes.
pub struct Company {
    pub name: String,
    pub founded: u16,
    pub timeline: Timeline,
    pub credit_rating: TemporalStore<String>,
    pub employee_count: TemporalStore<u32>,
    pub revenue: TemporalStore<u64>,
}

/// Values of every tracked attribute at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyState {
    pub credit_rating: String,
    pub employee_count: u32,
    pub revenue: u64,
}

impl std::fmt::Display for CompanyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Credit Rating: {}", self.credit_rating)?;
        writeln!(f, "  Employees: {}", self.employee_count)?;
        write!(f, "  Revenue: ${}", with_thousands(self.revenue))
    }
}

impl Company {
    pub fn new(name: impl Into<String>, founded: u16, clock: Rc<dyn Clock>) -> Self {
        let timeline = Timeline::with_clock(clock);
        Self {
            name: name.into(),
            founded,
            credit_rating: timeline.attribute("credit_rating", || "A".to_string()),
            employee_count: timeline.attribute("employee_count", || 50),
            revenue: timeline.attribute("revenue", || 1_000_000),
            timeline,
        }
    }

    /// Snapshot all three attributes.
    pub fn record_phase(&mut self, rating: &str, employees: u32, revenue: u64) {
        self.credit_rating.set_snapshot(rating.to_string());
        self.employee_count.set_snapshot(employees);
        self.revenue.set_snapshot(revenue);
    }

    /// Read all attributes through the timeline's current scope.
    pub fn state(&mut self) -> TemporalResult<CompanyState> {
        Ok(CompanyState {
            credit_rating: self.credit_rating.get()?.into_owned(),
            employee_count: *self.employee_count.get()?,
            revenue: *self.revenue.get()?,
        })
    }

    /// Read all attributes as they were at `at`.
    pub fn state_as_of(&mut self, at: Timestamp) -> TemporalResult<CompanyState> {
        let _guard = self.timeline.enter(Some(at));
        self.state()
    }
}

pub fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
