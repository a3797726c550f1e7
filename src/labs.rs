//! Lab sessions: group sizing and block placement.
//!
//! Every (section, lab subject, group) becomes one task that needs a block of
//! two adjacent slots. Tasks are placed in three increasingly loose phases:
//! combinational packing of parallel groups, one-by-one placement, then
//! placement without a teacher. Whatever is left is parked as unscheduled so
//! every task shows up in the grid exactly once.

use crate::data::Configuration;
use crate::fixed::FixedAssignments;
use crate::grid::{Booking, Grid, Occupancy, is_vacant};
use crate::ledger::ResourceLedger;
use crate::topology::{Block, lab_blocks};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use std::collections::HashSet;

/// Most groups of one section that may share a block.
const MAX_PARALLEL_GROUPS: usize = 3;

pub fn group_count(student_count: u32, lab_capacity: u32) -> usize {
    if lab_capacity == 0 {
        return 1;
    }
    student_count.div_ceil(lab_capacity).max(1) as usize
}

pub fn group_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("A{i}")).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabTask {
    pub section: usize,
    pub lab: String,
    pub group_index: usize,
    pub group_label: String,
    pub assigned: bool,
}

/// All lab tasks, section by section, group-major.
pub fn lab_tasks(config: &Configuration) -> Vec<LabTask> {
    let capacity = config.resources.lab_capacity;
    let mut tasks = Vec::new();
    for (section, sec) in config.sections.iter().enumerate() {
        let labels = group_labels(group_count(sec.student_count, capacity));
        for (group_index, label) in labels.iter().enumerate() {
            for lab in &sec.lab_subjects {
                tasks.push(LabTask {
                    section,
                    lab: lab.clone(),
                    group_index,
                    group_label: label.clone(),
                    assigned: false,
                });
            }
        }
    }
    tasks
}

/// How each task ended up being placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabReport {
    pub packed: usize,
    pub single: usize,
    pub without_teacher: usize,
    pub unscheduled: usize,
}

struct LabContext<'a> {
    config: &'a Configuration,
    fixed: &'a FixedAssignments,
    blocks: Vec<Block>,
}

/// A task with its resolved resources.
struct Placement {
    task: usize,
    room: Option<String>,
    teacher: Option<String>,
}

impl LabContext<'_> {
    /// The lab's own pool, then the shared lab pool, then the section's room.
    fn room_for(&self, task: &LabTask) -> Option<String> {
        let resources = &self.config.resources;
        let pool: Vec<Option<&str>> = match resources.lab_rooms.get(&task.lab) {
            Some(rooms) if !rooms.is_empty() => rooms.iter().map(|r| Some(r.as_str())).collect(),
            _ if !resources.labs.is_empty() => {
                resources.labs.iter().map(|r| Some(r.as_str())).collect()
            }
            _ => vec![self.fixed.room(task.section)],
        };
        pool[task.group_index % pool.len()].map(str::to_string)
    }

    fn teacher_for(&self, task: &LabTask) -> Option<String> {
        let section = &self.config.sections[task.section].name;
        self.fixed.teacher(section, &task.lab).map(str::to_string)
    }

    fn placement(&self, tasks: &[LabTask], task: usize) -> Placement {
        Placement {
            task,
            room: self.room_for(&tasks[task]),
            teacher: self.teacher_for(&tasks[task]),
        }
    }

    /// Whether `room`/`teacher` can take both slots of `block` for `section`.
    #[allow(clippy::too_many_arguments)]
    fn block_open(
        &self,
        grid: &Grid,
        ledger: &ResourceLedger,
        section: usize,
        day: usize,
        block: Block,
        room: Option<&str>,
        teacher: Option<&str>,
    ) -> bool {
        [block.0, block.1].into_iter().all(|slot| {
            is_vacant(grid.cell(section, day, slot))
                && ledger.is_free(room, teacher, day, slot)
                && !self.config.teacher_unavailable(
                    teacher,
                    &self.config.days[day],
                    &self.config.slots[slot],
                )
        })
    }

    /// Resolves a candidate combination, rejecting it if any member clashes
    /// with the grid, the ledger or another member.
    fn try_combo(
        &self,
        grid: &Grid,
        ledger: &ResourceLedger,
        tasks: &[LabTask],
        combo: &[usize],
        day: usize,
        block: Block,
    ) -> Option<Vec<Placement>> {
        let section = tasks[combo[0]].section;
        let mut rooms: HashSet<(String, usize)> = HashSet::new();
        let mut teachers: HashSet<(String, usize)> = HashSet::new();
        let mut placements = Vec::with_capacity(combo.len());

        for &task in combo {
            let p = self.placement(tasks, task);
            let (room, teacher) = (p.room.as_deref(), p.teacher.as_deref());
            if !self.block_open(grid, ledger, section, day, block, room, teacher) {
                return None;
            }
            for slot in [block.0, block.1] {
                if let Some(room) = &p.room {
                    if !rooms.insert((room.clone(), slot)) {
                        return None;
                    }
                }
                if let Some(teacher) = &p.teacher {
                    if !teachers.insert((teacher.clone(), slot)) {
                        return None;
                    }
                }
            }
            placements.push(p);
        }
        Some(placements)
    }

    fn commit(
        &self,
        grid: &mut Grid,
        ledger: &mut ResourceLedger,
        tasks: &mut [LabTask],
        placement: &Placement,
        day: usize,
        block: Block,
    ) {
        let task = &mut tasks[placement.task];
        for slot in [block.0, block.1] {
            grid.cell_mut(task.section, day, slot).push(Occupancy::Lab {
                booking: Booking::new(&task.lab, placement.room.clone(), placement.teacher.clone()),
                group: task.group_label.clone(),
            });
            ledger.reserve(placement.room.as_deref(), placement.teacher.as_deref(), day, slot);
        }
        task.assigned = true;
    }

    /// Phase 1: per (block, day, section), commit the largest feasible set of
    /// parallel groups with pairwise distinct groups and lab subjects.
    fn pack(&self, grid: &mut Grid, ledger: &mut ResourceLedger, tasks: &mut [LabTask]) -> usize {
        let mut packed = 0;
        for &block in &self.blocks {
            for day in 0..self.config.days.len() {
                if tasks.iter().all(|t| t.assigned) {
                    return packed;
                }
                for section in 0..self.config.sections.len() {
                    let pending: Vec<usize> = (0..tasks.len())
                        .filter(|&i| !tasks[i].assigned && tasks[i].section == section)
                        .collect();
                    if pending.is_empty() {
                        continue;
                    }
                    let groups = pending.iter().map(|&i| tasks[i].group_index).unique().count();
                    let cap = groups.min(MAX_PARALLEL_GROUPS);

                    let chosen = (1..=cap).rev().find_map(|k| {
                        pending.iter().copied().combinations(k).find_map(|combo| {
                            let distinct_groups =
                                combo.iter().map(|&i| tasks[i].group_index).unique().count() == k;
                            let distinct_labs =
                                combo.iter().map(|&i| tasks[i].lab.as_str()).unique().count() == k;
                            if !(distinct_groups && distinct_labs) {
                                return None;
                            }
                            self.try_combo(grid, ledger, tasks, &combo, day, block)
                        })
                    });

                    if let Some(placements) = chosen {
                        trace!(
                            "Packed {} lab group(s) for {} on {} at {:?}",
                            placements.len(),
                            self.config.sections[section].name,
                            self.config.days[day],
                            block
                        );
                        for p in &placements {
                            self.commit(grid, ledger, tasks, p, day, block);
                        }
                        packed += placements.len();
                    }
                }
            }
        }
        packed
    }

    /// First (block, day) where the task fits, optionally ignoring teachers.
    fn first_fit(
        &self,
        grid: &Grid,
        ledger: &ResourceLedger,
        section: usize,
        room: Option<&str>,
        teacher: Option<&str>,
    ) -> Option<(usize, Block)> {
        self.blocks.iter().find_map(|&block| {
            (0..self.config.days.len())
                .find(|&day| self.block_open(grid, ledger, section, day, block, room, teacher))
                .map(|day| (day, block))
        })
    }
}

/// Places every lab task in `grid`, reserving resources in `ledger`.
pub fn schedule_labs(
    config: &Configuration,
    fixed: &FixedAssignments,
    grid: &mut Grid,
    ledger: &mut ResourceLedger,
) -> LabReport {
    let ctx = LabContext {
        config,
        fixed,
        blocks: lab_blocks(&config.slots),
    };
    let mut tasks = lab_tasks(config);
    info!(
        "Scheduling {} lab tasks over {} blocks and {} days",
        tasks.len(),
        ctx.blocks.len(),
        config.days.len()
    );

    let mut report = LabReport {
        packed: ctx.pack(grid, ledger, &mut tasks),
        ..Default::default()
    };

    for i in 0..tasks.len() {
        if tasks[i].assigned {
            continue;
        }
        let section = tasks[i].section;
        let p = ctx.placement(&tasks, i);
        if let Some((day, block)) =
            ctx.first_fit(grid, ledger, section, p.room.as_deref(), p.teacher.as_deref())
        {
            ctx.commit(grid, ledger, &mut tasks, &p, day, block);
            report.single += 1;
            continue;
        }

        let teacherless = Placement { teacher: None, ..p };
        let room = teacherless.room.as_deref();
        if let Some((day, block)) = ctx.first_fit(grid, ledger, section, room, None) {
            warn!(
                "Placed {} group {} for {} without a teacher",
                tasks[i].lab, tasks[i].group_label, config.sections[section].name
            );
            ctx.commit(grid, ledger, &mut tasks, &teacherless, day, block);
            report.without_teacher += 1;
            continue;
        }

        let task = &mut tasks[i];
        warn!(
            "Could not place {} group {} for {}; marking unscheduled",
            task.lab, task.group_label, config.sections[section].name
        );
        let parking = grid.teaching_slots().last().copied();
        if let Some(slot) = parking.filter(|_| !config.days.is_empty()) {
            grid.cell_mut(section, 0, slot).push(Occupancy::Unscheduled {
                lab: task.lab.clone(),
                group: task.group_label.clone(),
            });
        }
        task.assigned = true;
        report.unscheduled += 1;
    }

    debug!("Lab placement finished: {report:?}");
    report
}
