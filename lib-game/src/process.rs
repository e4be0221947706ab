use log::{debug, warn};

/// The most steps a single task may catch up on in one pass.
const MAX_CATCH_UP: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Continue,
    /// The task is done. It gets dropped on the next pass.
    Stop,
}

/// A unit of work driven by a [Scheduler]. `C` is whatever the owner of
/// the scheduler lends to its tasks every pass.
pub trait Tickable<C: ?Sized> {
    fn tick(&mut self, ctx: &mut C, dt: f32) -> Tick;
}

impl<C: ?Sized, F: FnMut(&mut C, f32) -> Tick> Tickable<C> for F {
    fn tick(&mut self, ctx: &mut C, dt: f32) -> Tick {
        self(ctx, dt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Task<C: ?Sized> {
    id: TaskId,
    process: Box<dyn Tickable<C>>,
    delay: f32,
    accumulated: f32,
    closed: bool,
}

/// An explicit list of timed tasks owned by the game loop.
///
/// A task with a positive delay runs once per `delay` seconds of
/// accumulated time. Other tasks run once per pass. Closing is
/// cooperative: a task closed mid-pass finishes that pass and is
/// removed at the start of the next one.
pub struct Scheduler<C: ?Sized> {
    tasks: Vec<Task<C>>,
    next_id: u64,
}

impl<C: ?Sized> Default for Scheduler<C> {
    fn default() -> Self {
        Scheduler::new()
    }
}

impl<C: ?Sized> Scheduler<C> {
    pub fn new() -> Self {
        Scheduler {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, process: impl Tickable<C> + 'static, delay: f32) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self.tasks.push(Task {
            id,
            process: Box::new(process),
            delay,
            accumulated: 0.0,
            closed: false,
        });
        debug!("Scheduled task {id:?} every {delay}s");
        id
    }

    /// Marks a task as closed. Returns `false` for unknown ids.
    pub fn close(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.closed = true;
                true
            }
            None => false,
        }
    }

    /// `true` while the task is in the list, even if it was closed.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    pub fn is_closed(&self, id: TaskId) -> bool {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .is_none_or(|task| task.closed)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn run(&mut self, ctx: &mut C, dt: f32) {
        self.tasks.retain(|task| {
            if task.closed {
                debug!("Dropping task {:?}", task.id);
            }
            !task.closed
        });

        for task in &mut self.tasks {
            if task.delay <= 0.0 {
                task.closed = task.process.tick(ctx, dt) == Tick::Stop;
                continue;
            }

            task.accumulated += dt;
            let mut steps = 0;
            while task.accumulated >= task.delay && !task.closed {
                if steps == MAX_CATCH_UP {
                    warn!(
                        "Task {:?} is behind by {:.2}ms, skipping",
                        task.id,
                        task.accumulated * 1000.0
                    );
                    task.accumulated = 0.0;
                    break;
                }
                task.accumulated -= task.delay;
                task.closed = task.process.tick(ctx, task.delay) == Tick::Stop;
                steps += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, Tick};

    #[derive(Default)]
    struct Counter {
        fast: u32,
        slow: u32,
    }

    #[test]
    fn delays() {
        let mut sched = Scheduler::<Counter>::new();
        sched.add(
            |ctx: &mut Counter, _dt: f32| {
                ctx.fast += 1;
                Tick::Continue
            },
            0.0,
        );
        sched.add(
            |ctx: &mut Counter, _dt: f32| {
                ctx.slow += 1;
                Tick::Continue
            },
            0.5,
        );

        let mut ctx = Counter::default();
        for _ in 0..10 {
            sched.run(&mut ctx, 0.25);
        }
        assert_eq!(ctx.fast, 10);
        assert_eq!(ctx.slow, 5);
    }

    #[test]
    fn catches_up_a_little() {
        let mut sched = Scheduler::<Counter>::new();
        sched.add(
            |ctx: &mut Counter, _dt: f32| {
                ctx.slow += 1;
                Tick::Continue
            },
            0.125,
        );
        let mut ctx = Counter::default();
        sched.run(&mut ctx, 0.5);
        assert_eq!(ctx.slow, 4);
        sched.run(&mut ctx, 100.0);
        assert_eq!(ctx.slow, 12);
    }

    #[test]
    fn stop_finishes_the_tick_then_drains() {
        let mut sched = Scheduler::<Counter>::new();
        let id = sched.add(
            |ctx: &mut Counter, _dt: f32| {
                ctx.fast += 1;
                if ctx.fast == 2 { Tick::Stop } else { Tick::Continue }
            },
            0.0,
        );

        let mut ctx = Counter::default();
        sched.run(&mut ctx, 0.1);
        sched.run(&mut ctx, 0.1);
        assert_eq!(ctx.fast, 2);
        assert!(sched.contains(id));
        assert!(sched.is_closed(id));

        sched.run(&mut ctx, 0.1);
        assert_eq!(ctx.fast, 2);
        assert!(!sched.contains(id));
        assert!(sched.is_empty());
    }

    #[test]
    fn close_from_outside() {
        let mut sched = Scheduler::<Counter>::new();
        let id = sched.add(
            |ctx: &mut Counter, _dt: f32| {
                ctx.fast += 1;
                Tick::Continue
            },
            0.0,
        );
        let mut ctx = Counter::default();
        sched.run(&mut ctx, 0.1);
        assert!(sched.close(id));
        sched.run(&mut ctx, 0.1);
        assert_eq!(ctx.fast, 1);
        assert_eq!(sched.len(), 0);
        assert!(!sched.close(id));
    }
}
