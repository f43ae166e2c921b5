use comfy_table::{Table, presets::UTF8_FULL};
use core_types::{NewStudent, Student, StudentStore};
use database::StudentGateway;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Why a prompt could not produce a value.
enum Interrupt {
    EndOfInput,
    InvalidInput(String),
    Io(io::Error),
}

impl From<io::Error> for Interrupt {
    fn from(e: io::Error) -> Self {
        Interrupt::Io(e)
    }
}

/// Whitespace-separated tokens over a line reader, so several numbers may
/// be typed on one line.
struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: AsyncBufRead + Unpin> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    async fn read_line(&mut self) -> Result<String, Interrupt> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(Interrupt::EndOfInput);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn next_token(&mut self) -> Result<String, Interrupt> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let line = self.read_line().await?;
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    async fn next_int(&mut self) -> Result<i32, Interrupt> {
        let token = self.next_token().await?;
        token.parse().map_err(|_| Interrupt::InvalidInput(token))
    }

    /// The rest of the current line if tokens are left on it, otherwise the
    /// next full line.
    async fn next_line(&mut self) -> Result<String, Interrupt> {
        if self.pending.is_empty() {
            return self.read_line().await;
        }
        Ok(self.pending.drain(..).collect::<Vec<_>>().join(" "))
    }

    fn discard_line(&mut self) {
        self.pending.clear();
    }
}

/// The interactive text menu: add, search, display all, exit.
///
/// Records added here live in a session store and are mirrored to the
/// database on a best-effort basis, exactly like the HTTP API.
pub struct Console<R, W> {
    input: Tokens<R>,
    output: W,
    store: StudentStore,
    gateway: Arc<dyn StudentGateway>,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, gateway: Arc<dyn StudentGateway>) -> Self {
        Self {
            input: Tokens::new(input),
            output,
            store: StudentStore::new(),
            gateway,
        }
    }

    /// Runs the menu until the user exits or input ends.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.write(concat!(
                "\n===== Student Result Management System =====\n",
                "1. Add Student Record\n",
                "2. Search Student (by Roll No)\n",
                "3. Display All Students\n",
                "4. Exit\n",
                "Enter choice: ",
            ))
            .await?;

            let outcome = match self.input.next_token().await {
                Ok(choice) => match choice.as_str() {
                    "1" => self.add_student().await,
                    "2" => self.search_student().await,
                    "3" => self.display_all().await,
                    "4" => {
                        self.write("Exiting... Goodbye!\n").await?;
                        return Ok(());
                    }
                    _ => {
                        self.input.discard_line();
                        self.write("Invalid choice!\n").await?;
                        Ok(())
                    }
                },
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {}
                Err(Interrupt::InvalidInput(token)) => {
                    self.input.discard_line();
                    self.write(&format!("Invalid input: {token}\n")).await?;
                }
                Err(Interrupt::EndOfInput) => return Ok(()),
                Err(Interrupt::Io(e)) => return Err(e.into()),
            }
        }
    }

    async fn add_student(&mut self) -> Result<(), Interrupt> {
        self.write("Enter Roll No: ").await?;
        let roll_no = self.input.next_int().await?;
        self.input.discard_line();

        self.write("Enter Name: ").await?;
        let name = self.input.next_line().await?;

        self.write("Enter Marks (3 subjects): ").await?;
        let subject1 = self.input.next_int().await?;
        let subject2 = self.input.next_int().await?;
        let subject3 = self.input.next_int().await?;
        self.input.discard_line();

        let student = NewStudent {
            roll_no,
            name,
            subject1,
            subject2,
            subject3,
        }
        .into_student();

        if !self.store.insert_if_absent(student.clone()).await {
            self.write(&format!("Student with roll number {roll_no} already exists!\n"))
                .await?;
            return Ok(());
        }

        match self.gateway.insert_student(&student).await {
            Ok(()) => self.write("Student inserted successfully!\n").await?,
            Err(e) => {
                tracing::warn!(roll_no, error = %e, "Database not available, student kept in memory.");
                self.write("Database not available, student kept for this session only.\n")
                    .await?
            }
        }

        self.write(&render_table(std::slice::from_ref(&student))).await?;
        Ok(())
    }

    async fn search_student(&mut self) -> Result<(), Interrupt> {
        self.write("Enter Roll No: ").await?;
        let roll_no = self.input.next_int().await?;
        self.input.discard_line();

        match self.store.find(roll_no).await {
            Some(student) => self.write(&render_table(&[student])).await?,
            None => self.write("Student not found!\n").await?,
        }
        Ok(())
    }

    async fn display_all(&mut self) -> Result<(), Interrupt> {
        self.input.discard_line();
        let students = self.store.all().await;
        if students.is_empty() {
            self.write("No students recorded yet.\n").await?;
        } else {
            self.write(&render_table(&students)).await?;
        }
        Ok(())
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}

fn render_table(students: &[Student]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Roll No",
        "Name",
        "Subject 1",
        "Subject 2",
        "Subject 3",
        "Total",
        "Percentage",
        "Grade",
    ]);

    for s in students {
        table.add_row(vec![
            s.roll_no.to_string(),
            s.name.clone(),
            s.subject1.to_string(),
            s.subject2.to_string(),
            s.subject3.to_string(),
            s.total.to_string(),
            format!("{:.2}", s.percentage),
            s.grade.to_string(),
        ]);
    }
    format!("{table}\n")
}
