use serde::Serialize;

/// The fixed parts of a synthetic Illumina-style read identifier, and the base coordinates the
/// counter is added to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdTemplate {
    pub instrument: String,
    pub run_id: String,
    pub flowcell: String,
    pub lane: u32,
    pub tile: u64,
    pub x: u64,
    pub y: u64,
    pub read_num: u32,
    pub filtered: bool,
    pub control_bits: u32,
    pub index: String,
}

impl Default for IdTemplate {
    fn default() -> Self {
        Self {
            instrument: "INSTRUMENT".into(),
            run_id: "1".into(),
            flowcell: "FLOWCELL".into(),
            lane: 1,
            tile: 1001,
            x: 1000,
            y: 1000,
            read_num: 1,
            filtered: false,
            control_bits: 0,
            index: "ATCG".into(),
        }
    }
}

/// Hands out identifiers of the form
/// `<instrument>:<run>:<flowcell>:<lane>:<tile>:<x>:<y> <read>:<Y|N>:<control>:<index>`.
///
/// Each call bumps an internal counter first, so the first identifier uses counter 1. `x` cycles
/// through 1000 values, `y` advances once per `x` cycle and `tile` once every million ids.
pub struct IdGenerator {
    template: IdTemplate,
    counter: u64,
}

impl IdGenerator {
    pub fn new(template: IdTemplate) -> Self {
        Self {
            template,
            counter: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.counter += 1;

        let t = &self.template;
        let x = t.x + self.counter % 1000;
        let y = t.y + self.counter / 1000;
        let tile = t.tile + self.counter / 1_000_000;

        format!(
            "{}:{}:{}:{}:{tile}:{x}:{y} {}:{}:{}:{}",
            t.instrument,
            t.run_id,
            t.flowcell,
            t.lane,
            t.read_num,
            if t.filtered { 'Y' } else { 'N' },
            t.control_bits,
            t.index
        )
    }
}
