use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use chrono::Local;

use crate::{
    catalog::{Catalog, CatalogId},
    core::{
        events::{Event, EventSubscriptions},
        goto::GotoOutcome,
        session::Session,
    },
    devices::{
        camera::{CameraService, FrameSource},
        motor_link::{Axis, Direction, MotorLink, SerialLink, SpeedTier},
        sensors::{self, HUMIDITY_ALERT, HUMIDITY_WARN},
    },
    options::Options,
    plate_solve::{PlateSolver, PlateSolverIface, SolveHint},
    sky_math::sexagesimal::{degrees_to_dms, degrees_to_hms},
};

fn timestamp() -> String {
    Local::now().format("%X").to_string()
}

fn print_status(text: &str) {
    println!("{} => {}", timestamp(), text);
}

/// Single-threaded operator console. Every command runs to completion
/// before the next prompt, so multi-step procedures can never overlap.
pub struct Console {
    session: Session,
    catalog: Catalog,
    camera:  CameraService,
    solver:  PlateSolver,
    link:    Option<SerialLink>,
    events:  Arc<EventSubscriptions>,
    camera_present: bool,
    steps_per_pulse_block: u32,
}

impl Console {
    pub fn new(options: &Options) -> Self {
        let camera = CameraService::new(&options.cam);
        let camera_present = camera.is_connected();
        if !camera_present {
            print_status("camera not connected, capture commands disabled");
        }

        let link = match SerialLink::open(&options.link) {
            Ok(link) => Some(link),
            Err(err) => {
                log::warn!("Motor link not available: {}", err);
                print_status("motor link not connected, motor commands disabled");
                None
            }
        };

        let events = Arc::new(EventSubscriptions::new());
        events.subscribe(|event| match event {
            Event::Status(text) => print_status(&text),
            Event::Progress(progress) => print_status(&format!(
                "calibration {:.0}% ({}/{})",
                100.0 * progress.cur as f64 / progress.total as f64,
                progress.cur, progress.total
            )),
        });

        Self {
            session: Session::new(),
            catalog: Catalog::new(&options.catalog.file),
            camera,
            solver: PlateSolver::new(&options.plate_solver),
            link,
            events,
            camera_present,
            steps_per_pulse_block: options.mount.steps_per_pulse_block,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("dob_goto console, `help` lists the commands");
        let stdin = std::io::stdin();
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" || line == "exit" {
                break;
            }
            if let Err(err) = self.exec_command(line) {
                println!("{} !! {}", timestamp(), err);
            }
        }
        Ok(())
    }

    fn exec_command(&mut self, line: &str) -> anyhow::Result<()> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or_default();
        let arg = words.next().unwrap_or_default();
        match cmd {
            "help"      => Self::cmd_help(),
            "state"     => self.cmd_state(),
            "target"    => self.cmd_target(arg)?,
            "image"     => self.cmd_image()?,
            "solve"     => self.cmd_solve()?,
            "calibrate" => self.cmd_calibrate()?,
            "compare"   => self.cmd_compare()?,
            "goto"      => self.cmd_goto()?,
            "az"        => self.cmd_jog(Axis::Azimuth, arg)?,
            "alt"       => self.cmd_jog(Axis::Altitude, arg)?,
            "focus"     => self.cmd_focus(arg)?,
            "sensors"   => self.cmd_sensors()?,
            _ => anyhow::bail!("Unknown command `{}`, try `help`", cmd),
        }
        Ok(())
    }

    fn cmd_help() {
        println!("\
target <M45|NGC224>  resolve a catalog target
image                capture one image
solve                capture and plate solve, store image position
calibrate            run the axis calibration sequence
compare              compute target/image difference and motor steps
goto                 move onto the target and report the residual
az  <+1|-1|+2|-2|+3|-3>   jog the azimuth axis (speed tier 1-3)
alt <+1|-1|+2|-2|+3|-3>   jog the altitude axis
focus <+1..-3>       move the focuser
sensors              read the environmental sensors
state                show the session state
quit                 save options and exit");
    }

    fn cmd_state(&self) {
        let session = &self.session;
        println!("stage: {}", session.stage().to_str());
        if session.position_unknown() {
            println!("warning: position unknown after unconfirmed motion, run `solve` or `calibrate`");
        }
        if let Some(target) = session.target() {
            println!(
                "target {}: ra={} dec={} ({:.2}, {:.2})",
                target.id,
                degrees_to_hms(target.coord.ra), degrees_to_dms(target.coord.dec),
                target.coord.ra, target.coord.dec
            );
        }
        if let Some(model) = session.model() {
            println!(
                "calibration: angle={:.1} deg, az={:.2} deg/block, alt={:.2} deg/block",
                crate::sky_math::math::radian_to_degree(model.angle),
                model.az_scale, model.alt_scale
            );
        }
        if let Some(image) = session.image_coord() {
            println!("image: ra={:.2} dec={:.2}", image.ra, image.dec);
        }
        if let Some(result) = session.compared() {
            println!(
                "plan: az={} steps, alt={} steps",
                result.plan.az_steps, result.plan.alt_steps
            );
        }
    }

    fn cmd_target(&mut self, arg: &str) -> anyhow::Result<()> {
        if arg.is_empty() {
            anyhow::bail!("Usage: target <M45|NGC224>");
        }
        let id: CatalogId = arg.parse()?;
        let target = self.session.resolve_target(&self.catalog, &id)?;
        print_status(&format!(
            "target {}: ra={} dec={}",
            target.id,
            degrees_to_hms(target.coord.ra),
            degrees_to_dms(target.coord.dec)
        ));
        Ok(())
    }

    fn check_camera(&self) -> anyhow::Result<()> {
        if !self.camera_present {
            anyhow::bail!("Camera is not connected");
        }
        Ok(())
    }

    fn link(link: &mut Option<SerialLink>) -> anyhow::Result<&mut SerialLink> {
        link.as_mut()
            .ok_or_else(|| anyhow::anyhow!("Motor link is not connected"))
    }

    fn cmd_image(&mut self) -> anyhow::Result<()> {
        self.check_camera()?;
        print_status("image requested");
        let path = self.camera.capture()?;
        print_status(&format!("image saved as {}", path.display()));
        Ok(())
    }

    fn cmd_solve(&mut self) -> anyhow::Result<()> {
        self.check_camera()?;
        let Some(target) = self.session.target() else {
            anyhow::bail!("Resolve a target first, the solver needs its position hint");
        };
        let hint = SolveHint {
            ra_hours: target.ra_hours,
            spd:      target.spd,
        };
        print_status("coordinates requested");
        let image = self.camera.capture()?;
        let coord = self.solver.solve(&image, &hint)?;
        print_status(&format!("image at ra={:.2} dec={:.2}", coord.ra, coord.dec));
        self.session.set_image_coord(coord);
        Ok(())
    }

    fn cmd_calibrate(&mut self) -> anyhow::Result<()> {
        self.check_camera()?;
        let link = Self::link(&mut self.link)?;
        print_status("calibration started");
        self.session.calibrate(link, &self.camera, &self.solver, &self.events)?;
        Ok(())
    }

    fn cmd_compare(&mut self) -> anyhow::Result<()> {
        let result = self.session.compare(self.steps_per_pulse_block)?;
        println!(
            "target:  az={:8.2}  alt={:8.2}",
            result.target_mount.az, result.target_mount.alt
        );
        println!(
            "image:   az={:8.2}  alt={:8.2}",
            result.image_mount.az, result.image_mount.alt
        );
        println!(
            "diff:    az={:8.2}  alt={:8.2}  (ra={:.2} dec={:.2})",
            result.diff_az, result.diff_alt, result.diff_ra, result.diff_dec
        );
        println!(
            "steps:   az={:8}  alt={:8}",
            result.plan.az_steps, result.plan.alt_steps
        );
        Ok(())
    }

    fn cmd_goto(&mut self) -> anyhow::Result<()> {
        self.check_camera()?;
        let link = Self::link(&mut self.link)?;
        print_status("goto requested");
        let outcome = self.session.goto(
            link, &self.camera, &self.solver,
            self.steps_per_pulse_block, &self.events,
        )?;
        match outcome {
            GotoOutcome::Completed { residual, .. } => {
                print_status("goto finished, check results");
                println!(
                    "residual: az={:.2} alt={:.2}, steps az={} alt={}",
                    residual.diff_az, residual.diff_alt,
                    residual.plan.az_steps, residual.plan.alt_steps
                );
            }
            GotoOutcome::Unconfirmed { axis } => {
                print_status(&format!(
                    "goto NOT confirmed on {} axis: moved but unconfirmed, \
                     run `solve` or `calibrate` before trusting the position",
                    axis.to_str()
                ));
            }
        }
        Ok(())
    }

    fn parse_jog_arg(arg: &str) -> anyhow::Result<(Direction, SpeedTier)> {
        let dir = match arg.chars().next() {
            Some('+') => Direction::Positive,
            Some('-') => Direction::Negative,
            _ => anyhow::bail!("Expected `+1`..`+3` or `-1`..`-3`, got `{}`", arg),
        };
        let tier = match &arg[1..] {
            "1" => SpeedTier::Slow,
            "2" => SpeedTier::Medium,
            "3" => SpeedTier::Fast,
            _ => anyhow::bail!("Expected speed tier 1, 2 or 3, got `{}`", arg),
        };
        Ok((dir, tier))
    }

    fn cmd_jog(&mut self, axis: Axis, arg: &str) -> anyhow::Result<()> {
        let (dir, tier) = Self::parse_jog_arg(arg)?;
        let link = Self::link(&mut self.link)?;
        link.jog(axis, dir, tier)?;
        self.session.notify_manual_motion();
        print_status(&format!("moved {}{}", axis.to_str(), arg));
        Ok(())
    }

    fn cmd_focus(&mut self, arg: &str) -> anyhow::Result<()> {
        let (dir, tier) = Self::parse_jog_arg(arg)?;
        let link = Self::link(&mut self.link)?;
        link.focus(dir, tier)?;
        Ok(())
    }

    fn cmd_sensors(&mut self) -> anyhow::Result<()> {
        let link = Self::link(&mut self.link)?;
        let readings = sensors::read_sensors(link)?;
        let humidity_mark = |value: f64| {
            if value >= HUMIDITY_ALERT { " !!" }
            else if value >= HUMIDITY_WARN { " !" }
            else { "" }
        };
        println!("stepper driver temp: {:.1} C", readings.temp);
        println!("eq. table:  {:.1} C  {:.1} %{}", readings.t_eq_table,
            readings.h_eq_table, humidity_mark(readings.h_eq_table));
        println!("intake:     {:.1} C  {:.1} %{}", readings.t_intake,
            readings.h_intake, humidity_mark(readings.h_intake));
        println!("outflow:    {:.1} C  {:.1} %{}", readings.t_outflow,
            readings.h_outflow, humidity_mark(readings.h_outflow));
        Ok(())
    }
}
